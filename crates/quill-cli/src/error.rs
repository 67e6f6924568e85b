//! CLI errors

use std::path::PathBuf;

use quill_checker::ReleaseParseError;
use quill_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid schema {}: {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("invalid command tree {}: {source}", path.display())]
    Commands {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Release(#[from] ReleaseParseError),

    #[error("cannot tell the grammar of {}; pass --grammar", path.display())]
    UnknownGrammar { path: PathBuf },

    #[error("offset {offset} is past the end of {} ({len} bytes)", path.display())]
    OffsetOutOfBounds { path: PathBuf, offset: usize, len: usize },

    #[error("cannot walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("check task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("cannot write output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Read {
            path: path.into(),
            source,
        }
    }
}
