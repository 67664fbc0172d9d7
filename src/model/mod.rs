use std::{
    collections::HashMap,
    io::{Read, Write},
};

use rayon::prelude::*;

use crate::{
    alphabet::{fold_case, Alphabet},
    dataset::{Quadgram, QuadgramDataset},
    error::{Error, Result},
};

mod serde;

/// The largest alphabet whose positions fit into a `u8`.
pub const MAX_ALPHABET_SIZE: usize = 256;

/// Log10 probabilities of all quadgrams over an alphabet, built once from a [`QuadgramDataset`].
///
/// The table is a flat buffer of `alphabet_length^4` cells addressed by
/// `((i * A + j) * A + k) * A + l` over the positions of the four characters.
/// Unseen quadgrams hold `floor`.
#[derive(Debug, Clone)]
pub struct FitnessModel {
    alphabet: Alphabet,
    position_of: HashMap<char, u8>,
    char_of: Vec<char>,
    table: Vec<f64>,
    floor: f64,
    normal: f64,
}

impl FitnessModel {
    /// Builds the model from a snapshot of `dataset`.
    ///
    /// Later changes to `dataset` do not affect the model.
    /// Records with a count of zero keep the floor and are left out of `normal`,
    /// which is the mean over the records with a positive count.
    pub fn new(dataset: &QuadgramDataset) -> Result<Self> {
        let alphabet = dataset.alphabet().clone();
        let (position_of, char_of) = build_positions(&alphabet)?;
        let alphabet_length = char_of.len();
        let table_length = table_length(alphabet_length)?;

        let total_count = dataset.total_count();
        if total_count == 0 {
            return Err(Error::EmptyCorpus);
        }
        let total_count = total_count as f64;
        let floor = (1.0 / total_count).log10();

        let mut table = allocate_table(table_length, floor)?;

        let mut sum = 0.0;
        let mut observed_count = 0usize;
        for (quadgram, count) in dataset.iter() {
            // Zero counts keep the floor.
            if count == 0 {
                continue;
            }

            let log_probability = (count as f64 / total_count).log10();
            // All dataset characters are members of the alphabet.
            let index = quadgram_index(alphabet_length, quadgram.map(|c| position_of[&c]));
            table[index] = log_probability;
            sum += log_probability;
            observed_count += 1;
        }

        if observed_count == 0 {
            return Err(Error::EmptyCorpus);
        }
        let normal = (sum / observed_count as f64).abs();
        if normal == 0.0 {
            return Err(Error::DegenerateCorpus);
        }

        Ok(Self {
            alphabet,
            position_of,
            char_of,
            table,
            floor,
            normal,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn alphabet_length(&self) -> usize {
        self.char_of.len()
    }

    /// The log10 probability assigned to unseen quadgrams.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// The magnitude of the mean of all observed log10 probabilities.
    pub fn normal(&self) -> f64 {
        self.normal
    }

    pub fn position_of(&self, character: char) -> Option<u8> {
        self.position_of.get(&fold_case(character)).copied()
    }

    pub fn char_of(&self, position: u8) -> Option<char> {
        self.char_of.get(position as usize).copied()
    }

    /// Returns the table cell of a quadgram, or `None` if it contains a non-alphabet character.
    pub fn log_probability(&self, quadgram: Quadgram) -> Option<f64> {
        let mut positions = [0; 4];
        for (position, character) in positions.iter_mut().zip(quadgram) {
            *position = self.position_of(character)?;
        }
        Some(self.table[quadgram_index(self.alphabet_length(), positions)])
    }

    /// Maps a text to alphabet positions, dropping all characters outside the alphabet.
    pub fn positions(&self, text: &str) -> Vec<u8> {
        text.chars()
            .filter_map(|character| self.position_of(character))
            .collect()
    }

    pub fn get_fitness(&self, text: &str) -> Result<f64> {
        self.get_fitness_of_positions(&self.positions(text), None)
    }

    pub fn get_fitness_with_max_length(&self, text: &str, max_length: usize) -> Result<f64> {
        self.get_fitness_of_positions(&self.positions(text), Some(max_length))
    }

    /// Scores a sequence of alphabet positions as `((mean - normal) / normal)^8`,
    /// where `mean` is the mean table value over all quadgram windows.
    ///
    /// Only the first `max_length` positions are considered if given.
    /// Fails with [`Error::InsufficientData`] if fewer than four positions are considered,
    /// and with [`Error::InvalidPosition`] if a considered position is not smaller than the alphabet length.
    pub fn get_fitness_of_positions(
        &self,
        positions: &[u8],
        max_length: Option<usize>,
    ) -> Result<f64> {
        let usable = max_length.map_or(positions.len(), |max| max.min(positions.len()));
        if usable < 4 {
            return Err(Error::InsufficientData { usable });
        }

        let alphabet_length = self.alphabet_length();
        if let Some(position) = positions[..usable]
            .iter()
            .copied()
            .find(|position| *position as usize >= alphabet_length)
        {
            return Err(Error::InvalidPosition {
                position,
                alphabet_length,
            });
        }

        let window_count = usable - 3;
        let sum: f64 = positions[..usable]
            .windows(4)
            .map(|w| self.table[quadgram_index(alphabet_length, [w[0], w[1], w[2], w[3]])])
            .sum();
        let mean = sum / window_count as f64;

        Ok(((mean - self.normal) / self.normal).powi(8))
    }

    /// Writes the model as CBOR.
    pub fn save(&self, writer: impl Write) -> Result<()> {
        ciborium::into_writer(self, writer)?;
        Ok(())
    }

    /// Reads a model written by [`FitnessModel::save`].
    pub fn load(reader: impl Read) -> Result<Self> {
        Ok(ciborium::from_reader(reader)?)
    }
}

fn build_positions(alphabet: &Alphabet) -> Result<(HashMap<char, u8>, Vec<char>)> {
    if alphabet.len() > MAX_ALPHABET_SIZE {
        return Err(Error::AlphabetTooLarge {
            size: alphabet.len(),
        });
    }
    if alphabet.is_empty() {
        return Err(Error::EmptyAlphabet);
    }

    let char_of: Vec<char> = alphabet.chars().collect();
    let position_of = char_of
        .iter()
        .enumerate()
        .map(|(position, character)| (*character, position as u8))
        .collect();
    Ok((position_of, char_of))
}

fn table_length(alphabet_length: usize) -> Result<usize> {
    alphabet_length.checked_pow(4).ok_or(Error::TableTooLarge {
        cells: usize::MAX,
    })
}

/// Allocates a table of `table_length` cells and fills it with `floor` in parallel.
fn allocate_table(table_length: usize, floor: f64) -> Result<Vec<f64>> {
    let mut table = Vec::new();
    table
        .try_reserve_exact(table_length)
        .map_err(|_| Error::TableTooLarge {
            cells: table_length,
        })?;
    table.par_extend((0..table_length).into_par_iter().map(|_| floor));
    Ok(table)
}

#[inline]
fn quadgram_index(alphabet_length: usize, [i, j, k, l]: [u8; 4]) -> usize {
    ((i as usize * alphabet_length + j as usize) * alphabet_length + k as usize) * alphabet_length
        + l as usize
}
