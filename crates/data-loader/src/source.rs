//! Interaction data providers.
//!
//! The recommender only ever sees a stream of `InteractionRecord`s. Where
//! that stream comes from is a configuration choice:
//! - `SyntheticSource`: a small built-in purchase dataset for demos and tests
//! - `FileSource`: a delimited export (purchase counts or like events)

use crate::error::{DataLoadError, Result};
use crate::parser::{self, DEFAULT_DELIMITER};
use crate::types::InteractionRecord;
use std::path::PathBuf;

/// Anything that can produce the full interaction dataset at startup.
///
/// `Send + Sync` so a source can be handed to a blocking task.
pub trait DataSource: Send + Sync {
    /// Returns the name of this source (for logging)
    fn name(&self) -> &str;

    /// Load every record. Called once, before training.
    fn load(&self) -> Result<Vec<InteractionRecord>>;
}

/// The built-in purchase dataset: four users, four items.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource;

impl SyntheticSource {
    /// (user_id, item_id, purchase_count)
    const ROWS: [(i64, i64, f32); 6] = [
        (0, 101, 1.0),
        (1, 101, 1.0),
        (1, 102, 2.0),
        (2, 103, 1.0),
        (3, 102, 1.0),
        (3, 104, 1.0),
    ];
}

impl DataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(&self) -> Result<Vec<InteractionRecord>> {
        Ok(Self::ROWS
            .iter()
            .map(|&(user_id, item_id, weight)| InteractionRecord::new(user_id, item_id, weight))
            .collect())
    }
}

/// Reads records from a delimited text file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    delimiter: char,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Configure the field delimiter (default: ',')
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl DataSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self) -> Result<Vec<InteractionRecord>> {
        parser::parse_interactions(&self.path, self.delimiter)
    }
}

/// Which provider to use, as selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Synthetic,
    File { path: PathBuf, delimiter: char },
}

impl SourceKind {
    /// Resolve a source name plus optional path into a `SourceKind`.
    pub fn from_parts(name: &str, path: Option<PathBuf>, delimiter: char) -> Result<Self> {
        match (name, path) {
            ("synthetic", _) => Ok(SourceKind::Synthetic),
            ("file", Some(path)) => Ok(SourceKind::File { path, delimiter }),
            ("file", None) => Err(DataLoadError::InvalidSource(
                "the file source requires a data path".to_string(),
            )),
            (other, _) => Err(DataLoadError::InvalidSource(format!(
                "unknown data source '{}' (expected 'synthetic' or 'file')",
                other
            ))),
        }
    }

    /// Instantiate the selected provider.
    pub fn open(&self) -> Box<dyn DataSource> {
        match self {
            SourceKind::Synthetic => Box::new(SyntheticSource),
            SourceKind::File { path, delimiter } => {
                Box::new(FileSource::new(path.clone()).with_delimiter(*delimiter))
            }
        }
    }
}
