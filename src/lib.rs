//! Quadgram fitness scoring.
//!
//! A [`QuadgramDataset`] collects quadgram counts of a training corpus.
//! A [`FitnessModel`] is built once from a dataset and then scores arbitrary text
//! by how closely its quadgram statistics resemble the corpus.
//! Lower scores indicate text closer to the corpus language.

pub mod alphabet;
pub mod corpus;
pub mod dataset;
pub mod error;
pub mod model;

pub use alphabet::{Alphabet, Language};
pub use dataset::QuadgramDataset;
pub use error::{Error, Result};
pub use model::FitnessModel;
