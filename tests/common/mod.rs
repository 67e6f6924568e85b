//! Shared fixtures for workspace integration tests

use std::fs;
use std::path::{Path, PathBuf};

use quill::checker::{Engine, Project};
use quill::schema::{parse_schema, McdocType, TagTable};

/// Root of the fixture data pack
pub fn pack_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("pack")
}

/// Load a file from tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to load fixture {}: {}", name, e))
}

/// Engine over the fixture schema and tags
pub fn engine() -> Engine {
    let schema = parse_schema(&load_fixture("schema.mcdoc")).expect("fixture schema should parse");
    let tags = TagTable::from_json(&load_fixture("tags.json")).expect("fixture tags should load");
    let mut project = Project::default();
    project
        .categories
        .insert("loot_table".into(), McdocType::reference("minecraft:loot_table"));
    Engine::new(schema, tags, project)
}

/// Every document in the fixture pack, as (pack-relative path with `/`, absolute path), sorted
pub fn pack_documents() -> Vec<(String, PathBuf)> {
    let root = pack_root();
    let mut found = Vec::new();
    collect(&root, &root, &mut found);
    found.sort();
    found
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) {
    let entries = fs::read_dir(dir).unwrap_or_else(|e| panic!("failed to read {}: {}", dir.display(), e));
    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, out);
            continue;
        }
        let relative = path
            .strip_prefix(root)
            .expect("walked path is under the root")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        out.push((relative, path));
    }
}
