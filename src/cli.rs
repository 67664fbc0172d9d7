use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use simplelog::LevelFilter;

use quadfit::{Alphabet, Language, Result};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// The level of log messages written to stderr.
    #[arg(long, default_value = "info", value_parser = parse_log_level)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: CliCommands,
}

fn parse_log_level(level: &str) -> std::result::Result<LevelFilter, String> {
    level
        .parse()
        .map_err(|_| format!("unknown log level {level:?}"))
}

#[derive(Subcommand)]
pub enum CliCommands {
    /// Count the quadgrams of a text and write them as corpus records.
    Count(CountCommand),

    /// Build a fitness model from a corpus file.
    BuildModel(BuildModelCommand),

    /// Score a text against a fitness model.
    Score(ScoreCommand),

    /// Generate text following the quadgram statistics of a corpus.
    Sample(SampleCommand),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct AlphabetArguments {
    /// Use the alphabet of a built-in language.
    #[arg(long, value_enum)]
    pub language: Option<Language>,

    /// Use the given characters as alphabet.
    #[arg(long)]
    pub alphabet: Option<String>,
}

impl AlphabetArguments {
    pub fn alphabet(&self) -> Result<Alphabet> {
        if let Some(characters) = &self.alphabet {
            characters.parse()
        } else {
            // The argument group requires one of both.
            Ok(self.language.unwrap_or(Language::English).alphabet())
        }
    }
}

#[derive(Args)]
pub struct CountCommand {
    #[command(flatten)]
    pub alphabet: AlphabetArguments,

    /// The training text.
    #[arg(long)]
    pub input: PathBuf,

    /// The corpus file to write.
    #[arg(long)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct BuildModelCommand {
    #[command(flatten)]
    pub alphabet: AlphabetArguments,

    /// A corpus file with one `<quadgram> <count>` record per line.
    #[arg(long)]
    pub corpus: PathBuf,

    /// The model file to write.
    #[arg(long)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ScoreCommand {
    /// A model file written by `build-model`.
    #[arg(long, conflicts_with_all = ["language", "alphabet", "corpus"])]
    pub model: Option<PathBuf>,

    /// Build the model from the corpus of a built-in language.
    #[arg(long, value_enum, conflicts_with = "alphabet")]
    pub language: Option<Language>,

    /// Build the model over the given characters.
    #[arg(long, requires = "corpus")]
    pub alphabet: Option<String>,

    /// The corpus to build the model from.
    /// Defaults to the corpus file of the language.
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Consider at most this many alphabet characters of the text.
    #[arg(long)]
    pub max_length: Option<usize>,

    /// The text to score. Read from stdin if absent.
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Args)]
pub struct SampleCommand {
    #[command(flatten)]
    pub alphabet: AlphabetArguments,

    #[arg(long)]
    pub corpus: PathBuf,

    /// The number of characters to generate.
    #[arg(long, default_value_t = 1000)]
    pub length: usize,

    #[arg(long, default_value_t = 0)]
    pub random_seed: u64,
}
