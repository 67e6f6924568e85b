//! Project configuration (`quill.json`)
//!
//! Every field is optional. Relative paths resolve against the directory the
//! config file lives in.
//!
//! ```json
//! {
//!   "release": "1.20.4",
//!   "schemas": ["schemas/entities.mcdoc", "schemas/vanilla.json"],
//!   "schema_dir": "schemas/types",
//!   "tags": "tags.json",
//!   "commands": "commands.json",
//!   "categories": { "loot_table": "minecraft:loot_table" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quill_checker::{prefetch, Engine, Project, ReleaseVersion};
use quill_parser::command::CommandTree;
use quill_schema::{parse_schema, McdocType, SchemaTable, TagTable};
use serde::{Deserialize, Serialize};

use crate::error::CliError;
use crate::loader::FsSchemaLoader;

pub const CONFIG_FILE: &str = "quill.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Targeted release; latest when absent
    pub release: Option<ReleaseVersion>,
    /// Schema files loaded up front: `.json` tables or schema-language sources
    pub schemas: Vec<PathBuf>,
    /// Directory of per-type schema files fetched on demand
    pub schema_dir: Option<PathBuf>,
    /// Tag and registry table (JSON)
    pub tags: Option<PathBuf>,
    /// Command tree replacing the built-in one (JSON)
    pub commands: Option<PathBuf>,
    /// Resource category to the type path its documents are checked against
    pub categories: BTreeMap<String, String>,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::read(path, e))?;
        let mut config: ProjectConfig = serde_json::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `explicit` if given, else `quill.json` under `root` if present, else defaults
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<Self, CliError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = root.join(CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Self {
            base_dir: root.to_path_buf(),
            ..Self::default()
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn project(&self) -> Project {
        Project {
            release: self.release,
            categories: self
                .categories
                .iter()
                .map(|(category, path)| (category.clone(), McdocType::reference(path.as_str())))
                .collect(),
        }
    }

    /// Load every configured table and build the engine.
    ///
    /// Types reachable from the category table that no schema file defines
    /// are fetched from `schema_dir` before any document is checked.
    pub async fn build_engine(&self) -> Result<Engine, CliError> {
        let mut schema = SchemaTable::new();
        for path in &self.schemas {
            let path = self.resolve(path);
            schema.merge(load_schema(&path).await?);
        }

        let project = self.project();
        if let Some(dir) = &self.schema_dir {
            let loader = FsSchemaLoader::new(self.resolve(dir));
            let roots: Vec<McdocType> = project.categories.values().cloned().collect();
            let loaded = prefetch(&loader, &mut schema, &roots).await?;
            tracing::debug!(loaded, "prefetched category schemas");
        }

        let tags = match &self.tags {
            Some(path) => {
                let path = self.resolve(path);
                let text = read(&path).await?;
                TagTable::from_json(&text).map_err(|source| CliError::Schema { path, source })?
            }
            None => TagTable::new(),
        };

        let engine = Engine::new(schema, tags, project);
        match &self.commands {
            Some(path) => {
                let path = self.resolve(path);
                let text = read(&path).await?;
                let commands = CommandTree::from_json(&text).map_err(|source| CliError::Commands { path, source })?;
                Ok(engine.with_commands(commands))
            }
            None => Ok(engine),
        }
    }
}

async fn read(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::read(path, e))
}

/// A `.json` schema table, or schema-language source for any other extension
pub async fn load_schema(path: &Path) -> Result<SchemaTable, CliError> {
    let text = read(path).await?;
    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => SchemaTable::from_json(&text),
        _ => parse_schema(&text),
    };
    parsed.map_err(|source| CliError::Schema {
        path: path.to_path_buf(),
        source,
    })
}
