use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("model serialisation error: {0}")]
    ModelSerialisation(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("model deserialisation error: {0}")]
    ModelDeserialisation(#[from] ciborium::de::Error<std::io::Error>),

    #[error("invalid quadgram {sequence:?}: expected exactly 4 characters")]
    InvalidSequence { sequence: String },

    #[error("quadgram {sequence:?} contains non-alphabet symbol {character:?}")]
    AlphabetViolation { character: char, sequence: String },

    #[error("quadgram {sequence:?} is already added")]
    DuplicateKey { sequence: String },

    #[error("alphabet has {size} characters, but at most 256 are supported")]
    AlphabetTooLarge { size: usize },

    #[error("the alphabet is empty")]
    EmptyAlphabet,

    #[error("a table of {cells} cells cannot be allocated")]
    TableTooLarge { cells: usize },

    #[error("position {position} is outside of the alphabet of length {alphabet_length}")]
    InvalidPosition { position: u8, alphabet_length: usize },

    #[error("the corpus contains no observations")]
    EmptyCorpus,

    #[error("all observations of the corpus belong to a single quadgram")]
    DegenerateCorpus,

    #[error("the total quadgram count overflows when adding {count}")]
    CountOverflow { count: u64 },

    #[error("malformed corpus record on line {line} ({content:?}): {reason}")]
    CorpusFormatError {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("text contains only {usable} usable characters, but at least 4 are required")]
    InsufficientData { usable: usize },
}
