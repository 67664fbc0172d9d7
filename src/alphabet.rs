use clap::ValueEnum;

use crate::error::{Error, Result};

/// Upper-cases a character if its upper-case form is a single character.
///
/// Characters like `ß`, whose upper-case form expands to several characters, are kept as they are.
pub fn fold_case(character: char) -> char {
    let mut upper = character.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(upper), None) => upper,
        _ => character,
    }
}

/// An ordered set of distinct upper-case characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    characters: Vec<char>,
}

impl Alphabet {
    pub fn new(characters: impl IntoIterator<Item = char>) -> Result<Self> {
        let mut result = Vec::new();
        for character in characters.into_iter().map(fold_case) {
            if !result.contains(&character) {
                result.push(character);
            }
        }

        if result.is_empty() {
            Err(Error::EmptyAlphabet)
        } else {
            Ok(Self { characters: result })
        }
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn contains(&self, character: char) -> bool {
        self.characters.contains(&fold_case(character))
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.characters.iter().copied()
    }
}

impl std::str::FromStr for Alphabet {
    type Err = Error;

    fn from_str(characters: &str) -> Result<Self> {
        Self::new(characters.chars())
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.characters.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

/// A language with a built-in alphabet and a default corpus file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
    English,
    Russian,
    German,
}

impl Language {
    pub fn alphabet_characters(self) -> &'static str {
        match self {
            Self::English => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            Self::Russian => "АБВГДЕЁЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ",
            Self::German => "ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÜß",
        }
    }

    pub fn alphabet(self) -> Alphabet {
        Alphabet {
            characters: self.alphabet_characters().chars().collect(),
        }
    }

    pub fn default_corpus_file(self) -> &'static str {
        match self {
            Self::English => "quadgrams_eng.txt",
            Self::Russian => "quadgrams_ru.txt",
            Self::German => "quadgrams_de.txt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fold_case, Alphabet, Language};
    use crate::error::Error;

    #[test]
    fn test_fold_case() {
        assert_eq!(fold_case('a'), 'A');
        assert_eq!(fold_case('Z'), 'Z');
        assert_eq!(fold_case('ё'), 'Ё');
        assert_eq!(fold_case('ä'), 'Ä');
        assert_eq!(fold_case('ß'), 'ß');
        assert_eq!(fold_case('1'), '1');
    }

    #[test]
    fn test_alphabet_deduplicates_after_folding() {
        let alphabet: Alphabet = "abcABCd".parse().unwrap();
        assert_eq!(alphabet.len(), 4);
        assert_eq!(alphabet.to_string(), "ABCD");
        assert!(alphabet.contains('d'));
        assert!(alphabet.contains('D'));
        assert!(!alphabet.contains('e'));
    }

    #[test]
    fn test_empty_alphabet() {
        assert!(matches!(
            "".parse::<Alphabet>(),
            Err(Error::EmptyAlphabet)
        ));
    }

    #[test]
    fn test_builtin_languages() {
        assert_eq!(Language::English.alphabet().len(), 26);
        assert_eq!(Language::Russian.alphabet().len(), 33);
        assert_eq!(Language::German.alphabet().len(), 30);

        for language in [Language::English, Language::Russian, Language::German] {
            let parsed: Alphabet = language.alphabet_characters().parse().unwrap();
            assert_eq!(parsed, language.alphabet());
        }
    }
}
