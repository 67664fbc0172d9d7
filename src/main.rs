use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::PathBuf,
    time::Instant,
};

use clap::Parser;
use cli::{BuildModelCommand, Cli, CliCommands, CountCommand, SampleCommand, ScoreCommand};
use log::{info, warn};
use quadfit::{
    corpus::{load_corpus_file, write_records},
    Alphabet, Error, FitnessModel, Language, QuadgramDataset, Result,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

mod cli;

fn main() {
    let cli = Cli::parse();

    if let Err(error) = TermLogger::init(
        cli.log_level,
        Default::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not initialise logging: {error}");
    }

    match cli.command {
        CliCommands::Count(count_command) => count(count_command),
        CliCommands::BuildModel(build_model_command) => build_model(build_model_command),
        CliCommands::Score(score_command) => score(score_command),
        CliCommands::Sample(sample_command) => sample(sample_command),
    }
    .unwrap_or_else(|error| {
        println!("Error: {error}");
        std::process::exit(1);
    });
}

fn count(count_command: CountCommand) -> Result<()> {
    let text = std::fs::read_to_string(&count_command.input)?;
    let dataset = QuadgramDataset::from_text(count_command.alphabet.alphabet()?, &text)?;
    info!(
        "Counted {} distinct quadgrams with a total count of {}",
        dataset.distinct_count(),
        dataset.total_count()
    );

    write_records(
        &dataset,
        BufWriter::new(File::create(&count_command.output)?),
    )
}

fn build_model(build_model_command: BuildModelCommand) -> Result<()> {
    let dataset = load_corpus_file(
        build_model_command.alphabet.alphabet()?,
        &build_model_command.corpus,
    )?;
    let model = build_timed(&dataset)?;
    model.save(BufWriter::new(File::create(&build_model_command.output)?))?;
    info!("Wrote model to {:?}", build_model_command.output);
    Ok(())
}

fn score(score_command: ScoreCommand) -> Result<()> {
    let model = if let Some(model) = &score_command.model {
        FitnessModel::load(BufReader::new(File::open(model)?))?
    } else {
        let (alphabet, corpus) = resolve_corpus(&score_command)?;
        build_timed(&load_corpus_file(alphabet, corpus)?)?
    };

    let text = if let Some(text) = score_command.text {
        text
    } else {
        std::io::read_to_string(std::io::stdin())?
    };

    let positions = model.positions(&text);
    match model.get_fitness_of_positions(&positions, score_command.max_length) {
        Ok(fitness) => println!("{}", round(fitness, 5)),
        Err(Error::InsufficientData { usable }) => {
            warn!("The text contains only {usable} usable characters");
            println!("Insufficient data: at least 4 characters of the alphabet are required");
        }
        Err(error) => return Err(error),
    }

    Ok(())
}

fn sample(sample_command: SampleCommand) -> Result<()> {
    let dataset = load_corpus_file(sample_command.alphabet.alphabet()?, &sample_command.corpus)?;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(sample_command.random_seed);
    println!("{}", dataset.sample_text(sample_command.length, &mut rng)?);
    Ok(())
}

fn resolve_corpus(score_command: &ScoreCommand) -> Result<(Alphabet, PathBuf)> {
    let alphabet = if let Some(characters) = &score_command.alphabet {
        characters.parse()?
    } else {
        score_command.language.unwrap_or(Language::English).alphabet()
    };

    let corpus = score_command.corpus.clone().unwrap_or_else(|| {
        PathBuf::from(
            score_command
                .language
                .unwrap_or(Language::English)
                .default_corpus_file(),
        )
    });

    Ok((alphabet, corpus))
}

fn build_timed(dataset: &QuadgramDataset) -> Result<FitnessModel> {
    let start = Instant::now();
    let model = FitnessModel::new(dataset)?;
    info!(
        "Built model over {} characters in {:.2?} (floor {:.4}, normal {:.4})",
        model.alphabet_length(),
        start.elapsed(),
        model.floor(),
        model.normal()
    );
    Ok(model)
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
