//! On-demand schema loading from a directory tree

use std::io::ErrorKind;
use std::path::PathBuf;

use quill_checker::SchemaLoader;
use quill_schema::SchemaTable;

use crate::config::load_schema;
use crate::error::CliError;

/// Loads the type `ns:a/b` from `<root>/ns/a/b.mcdoc` or `<root>/ns/a/b.json`
#[derive(Debug, Clone)]
pub struct FsSchemaLoader {
    root: PathBuf,
}

impl FsSchemaLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, path: &str) -> [PathBuf; 2] {
        let relative = path.replace(':', "/");
        [
            self.root.join(format!("{}.mcdoc", relative)),
            self.root.join(format!("{}.json", relative)),
        ]
    }
}

impl SchemaLoader for FsSchemaLoader {
    type Error = CliError;

    async fn load(&self, path: &str) -> Result<Option<SchemaTable>, CliError> {
        for candidate in self.candidates(path) {
            match tokio::fs::metadata(&candidate).await {
                Ok(meta) if meta.is_file() => return load_schema(&candidate).await.map(Some),
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CliError::read(candidate, e)),
            }
        }
        Ok(None)
    }
}
