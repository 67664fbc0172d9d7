use std::collections::BTreeMap;

use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

use crate::{
    alphabet::{fold_case, Alphabet},
    error::{Error, Result},
};

pub type Quadgram = [char; 4];

/// Observed quadgram counts over a fixed alphabet.
///
/// # Invariants
/// - Every character of every stored quadgram belongs to `alphabet`.
/// - `total_count` is the sum of all stored counts.
#[derive(Debug, Clone)]
pub struct QuadgramDataset {
    alphabet: Alphabet,
    counts: BTreeMap<Quadgram, u64>,
    total_count: u64,
}

impl QuadgramDataset {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            counts: Default::default(),
            total_count: 0,
        }
    }

    /// Counts all quadgrams of a training text.
    ///
    /// Characters outside the alphabet are dropped before counting, so quadgrams may span them.
    pub fn from_text(alphabet: Alphabet, text: &str) -> Result<Self> {
        let mut result = Self::new(alphabet);
        let characters: Vec<_> = text
            .chars()
            .map(fold_case)
            .filter(|character| result.alphabet.contains(*character))
            .collect();

        for window in characters.windows(4) {
            let quadgram = [window[0], window[1], window[2], window[3]];
            result.total_count = result
                .total_count
                .checked_add(1)
                .ok_or(Error::CountOverflow { count: 1 })?;
            *result.counts.entry(quadgram).or_insert(0) += 1;
        }

        Ok(result)
    }

    /// Inserts the count of a quadgram.
    ///
    /// The sequence is case-folded like the alphabet.
    /// On error, the dataset is left unchanged.
    pub fn add(&mut self, sequence: &str, count: u64) -> Result<()> {
        let quadgram = self.parse_quadgram(sequence)?;
        if self.counts.contains_key(&quadgram) {
            return Err(Error::DuplicateKey {
                sequence: sequence.to_string(),
            });
        }

        self.total_count = self
            .total_count
            .checked_add(count)
            .ok_or(Error::CountOverflow { count })?;
        self.counts.insert(quadgram, count);
        Ok(())
    }

    fn parse_quadgram(&self, sequence: &str) -> Result<Quadgram> {
        let mut quadgram = ['\0'; 4];
        let mut length = 0;
        for character in sequence.chars() {
            if length == 4 {
                return Err(Error::InvalidSequence {
                    sequence: sequence.to_string(),
                });
            }
            quadgram[length] = fold_case(character);
            length += 1;
        }

        if length != 4 {
            return Err(Error::InvalidSequence {
                sequence: sequence.to_string(),
            });
        }

        if let Some(character) = quadgram
            .iter()
            .copied()
            .find(|character| !self.alphabet.contains(*character))
        {
            return Err(Error::AlphabetViolation {
                character,
                sequence: sequence.to_string(),
            });
        }

        Ok(quadgram)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn distinct_count(&self) -> usize {
        self.counts.len()
    }

    pub fn get(&self, sequence: &str) -> Option<u64> {
        self.parse_quadgram(sequence)
            .ok()
            .and_then(|quadgram| self.counts.get(&quadgram).copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Quadgram, u64)> + '_ {
        self.counts
            .iter()
            .map(|(quadgram, count)| (*quadgram, *count))
    }

    /// Generates a text of `length` characters whose quadgrams follow the counts of this dataset.
    pub fn sample_text(&self, length: usize, rng: &mut impl Rng) -> Result<String> {
        let generator = QuadgramTextGenerator::new(self)?;
        Ok(generator.sample(length, rng))
    }
}

/// Markov chain over trigram prefixes, weighted by the quadgram counts.
struct QuadgramTextGenerator {
    quadgrams: Vec<Quadgram>,
    quadgram_sampler: WeightedIndex<u64>,
    successors: BTreeMap<[char; 3], (Vec<char>, WeightedIndex<u64>)>,
}

impl QuadgramTextGenerator {
    fn new(dataset: &QuadgramDataset) -> Result<Self> {
        let observed: Vec<_> = dataset.iter().filter(|(_, count)| *count > 0).collect();
        let quadgrams: Vec<_> = observed.iter().map(|(quadgram, _)| *quadgram).collect();
        let quadgram_sampler = WeightedIndex::new(observed.iter().map(|(_, count)| *count))
            .map_err(|_| Error::EmptyCorpus)?;

        let mut grouped: BTreeMap<[char; 3], (Vec<char>, Vec<u64>)> = BTreeMap::new();
        for (quadgram, count) in observed {
            let (characters, weights) = grouped
                .entry([quadgram[0], quadgram[1], quadgram[2]])
                .or_default();
            characters.push(quadgram[3]);
            weights.push(count);
        }

        let mut successors = BTreeMap::new();
        for (prefix, (characters, weights)) in grouped {
            // Weights are positive, so this cannot fail.
            let sampler = WeightedIndex::new(weights).map_err(|_| Error::EmptyCorpus)?;
            successors.insert(prefix, (characters, sampler));
        }

        Ok(Self {
            quadgrams,
            quadgram_sampler,
            successors,
        })
    }

    fn sample(&self, length: usize, rng: &mut impl Rng) -> String {
        let mut result: Vec<char> = Vec::with_capacity(length);

        while result.len() < length {
            let prefix = match result.as_slice() {
                [.., a, b, c] => Some([*a, *b, *c]),
                _ => None,
            };

            if let Some((characters, sampler)) = prefix.and_then(|p| self.successors.get(&p)) {
                result.push(characters[sampler.sample(rng)]);
            } else {
                let quadgram = self.quadgrams[self.quadgram_sampler.sample(rng)];
                let remaining = length - result.len();
                result.extend(quadgram.iter().take(remaining));
            }
        }

        result.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    use super::QuadgramDataset;
    use crate::{alphabet::Language, error::Error};

    fn english() -> QuadgramDataset {
        QuadgramDataset::new(Language::English.alphabet())
    }

    #[test]
    fn test_add_and_counts() {
        let mut dataset = english();
        assert_eq!(dataset.total_count(), 0);
        assert_eq!(dataset.distinct_count(), 0);

        dataset.add("TION", 1000).unwrap();
        dataset.add("the ", 0).unwrap_err();
        dataset.add("ther", 250).unwrap();

        assert_eq!(dataset.total_count(), 1250);
        assert_eq!(dataset.distinct_count(), 2);
        assert_eq!(dataset.get("tion"), Some(1000));
        assert_eq!(dataset.get("THER"), Some(250));
        assert_eq!(dataset.get("ABCD"), None);
    }

    #[test]
    fn test_invalid_sequence() {
        let mut dataset = english();
        for sequence in ["", "ABC", "ABCDE"] {
            assert!(matches!(
                dataset.add(sequence, 1),
                Err(Error::InvalidSequence { .. })
            ));
        }
        assert_eq!(dataset.distinct_count(), 0);
    }

    #[test]
    fn test_alphabet_violation_names_character() {
        let mut dataset = english();
        match dataset.add("AB1D", 5) {
            Err(Error::AlphabetViolation { character, .. }) => assert_eq!(character, '1'),
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(dataset.total_count(), 0);
    }

    #[test]
    fn test_duplicate_key_regardless_of_count() {
        let mut dataset = english();
        dataset.add("TION", 10).unwrap();
        for count in [0, 10, 99] {
            assert!(matches!(
                dataset.add("TION", count),
                Err(Error::DuplicateKey { .. })
            ));
        }
        assert!(matches!(
            dataset.add("tion", 1),
            Err(Error::DuplicateKey { .. })
        ));
        assert_eq!(dataset.total_count(), 10);
        assert_eq!(dataset.distinct_count(), 1);
    }

    #[test]
    fn test_count_overflow_leaves_dataset_unchanged() {
        let mut dataset = english();
        dataset.add("AAAA", u64::MAX).unwrap();
        assert!(matches!(
            dataset.add("AAAB", 1),
            Err(Error::CountOverflow { count: 1 })
        ));
        assert_eq!(dataset.distinct_count(), 1);
        assert_eq!(dataset.total_count(), u64::MAX);
    }

    #[test]
    fn test_from_text() {
        let dataset =
            QuadgramDataset::from_text(Language::English.alphabet(), "tion, tion!").unwrap();
        // TIONTION
        assert_eq!(dataset.total_count(), 5);
        assert_eq!(dataset.distinct_count(), 4);
        assert_eq!(dataset.get("TION"), Some(2));
        assert_eq!(dataset.get("IONT"), Some(1));
        assert_eq!(dataset.get("ONTI"), Some(1));
        assert_eq!(dataset.get("NTIO"), Some(1));
    }

    #[test]
    fn test_sample_text_uses_observed_quadgrams() {
        let dataset = QuadgramDataset::from_text(
            Language::English.alphabet(),
            "the quick brown fox jumps over the lazy dog",
        )
        .unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let text = dataset.sample_text(200, &mut rng).unwrap();
        assert_eq!(text.chars().count(), 200);
        assert!(text.chars().all(|c| dataset.alphabet().contains(c)));

        // Windows outside the dataset only appear where the chain restarts after "DOG".
        for offset in 0..text.len() - 3 {
            if dataset.get(&text[offset..offset + 4]).is_none() {
                let context = &text[offset.saturating_sub(2)..offset + 3];
                assert!(context.contains("DOG"), "unseen window at {offset} in {text}");
            }
        }
    }

    #[test]
    fn test_sample_text_of_empty_dataset() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert!(matches!(
            english().sample_text(10, &mut rng),
            Err(Error::EmptyCorpus)
        ));

        let mut dataset = english();
        dataset.add("AAAA", 0).unwrap();
        assert!(matches!(
            dataset.sample_text(10, &mut rng),
            Err(Error::EmptyCorpus)
        ));
    }
}
