//! Reading and writing corpus count files.
//!
//! A corpus file holds one `<quadgram> <count>` record per line.

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use log::{debug, info};

use crate::{
    alphabet::Alphabet,
    dataset::QuadgramDataset,
    error::{Error, Result},
};

/// Adds all records of `reader` to `dataset`.
///
/// Blank lines are skipped, any other malformed line is an error.
/// Returns the number of records added.
pub fn parse_and_fill(dataset: &mut QuadgramDataset, reader: impl BufRead) -> Result<usize> {
    let mut records = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        let (quadgram, count) = match (tokens.next(), tokens.next(), tokens.next()) {
            (None, _, _) => continue,
            (Some(quadgram), Some(count), None) => (quadgram, count),
            _ => {
                return Err(Error::CorpusFormatError {
                    line: index + 1,
                    content: line.clone(),
                    reason: "expected exactly two tokens".to_string(),
                })
            }
        };

        let count = count
            .parse::<u64>()
            .map_err(|error| Error::CorpusFormatError {
                line: index + 1,
                content: line.clone(),
                reason: format!("invalid count: {error}"),
            })?;

        dataset.add(quadgram, count)?;
        records += 1;
    }

    Ok(records)
}

/// Reads a corpus file into a new dataset over `alphabet`.
pub fn load_corpus_file(alphabet: Alphabet, path: impl AsRef<Path>) -> Result<QuadgramDataset> {
    let path = path.as_ref();
    debug!("Reading corpus {path:?}");

    let mut dataset = QuadgramDataset::new(alphabet);
    let records = parse_and_fill(&mut dataset, BufReader::new(File::open(path)?))?;

    info!(
        "Loaded {records} records with a total count of {} from {path:?}",
        dataset.total_count()
    );
    Ok(dataset)
}

/// Writes all records of `dataset` in the format read by [`parse_and_fill`].
pub fn write_records(dataset: &QuadgramDataset, mut writer: impl Write) -> Result<()> {
    for (quadgram, count) in dataset.iter() {
        let quadgram: String = quadgram.iter().collect();
        writeln!(writer, "{quadgram} {count}")?;
    }
    writer.flush()?;
    Ok(())
}
