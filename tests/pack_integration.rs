//! End-to-end tests over the fixture data pack
//!
//! Every document under tests/fixtures/pack is parsed and checked against the
//! fixture schema. Documents not listed in `expected_messages` must be clean.

mod common;

use std::fs;
use std::sync::Arc;

use quill::ast::{Range, Severity};
use quill::checker::{CheckedDocument, Engine};
use quill::parser::Grammar;

fn expected_messages(relative: &str) -> Vec<&'static str> {
    match relative {
        "data/demo/function/broken.mcfunction" => vec![
            "expected a boolean",
            "unexpected leading slash",
            "expected a value in range 0..",
            "expected a compound",
        ],
        "data/demo/loot_table/broken.json" => vec![
            "expected a value in range 1..",
            "missing required key name",
            "expected one of minecraft:item, minecraft:empty",
        ],
        _ => vec![],
    }
}

fn check(engine: &Engine, relative: &str, text: &str) -> CheckedDocument {
    let grammar = Grammar::from_path(relative).unwrap_or_else(|| panic!("no grammar for {}", relative));
    engine.check_text(text, grammar, Some(relative), None)
}

#[test]
fn e2e_all_documents_check() {
    let engine = common::engine();
    let documents = common::pack_documents();
    assert!(documents.len() >= 5, "fixture pack is incomplete: {:?}", documents);

    let mut failures = Vec::new();
    for (relative, path) in &documents {
        let text = fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {}: {}", relative, e));
        let checked = check(&engine, relative, &text);
        let messages: Vec<&str> = checked.diagnostics.iter().map(|d| d.message.as_str()).collect();
        let expected = expected_messages(relative);
        if messages == expected {
            println!("✓ {}", relative);
        } else {
            eprintln!("✗ {}", relative);
            failures.push(format!("  - {}: expected {:?}, got {:?}", relative, expected, messages));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} out of {} documents gave unexpected diagnostics:\n{}",
            failures.len(),
            documents.len(),
            failures.join("\n")
        );
    }
}

#[test]
fn e2e_diagnostic_positions() {
    let engine = common::engine();
    let text = common::load_fixture("pack/data/demo/function/broken.mcfunction");
    let checked = check(&engine, "data/demo/function/broken.mcfunction", &text);

    let slash = checked
        .diagnostics
        .iter()
        .find(|d| d.message == "unexpected leading slash")
        .expect("leading slash reported");
    let line_start = text.find('/').expect("slash in fixture");
    assert_eq!(slash.range, Range::new(line_start, line_start + 1));

    let particle = checked
        .diagnostics
        .iter()
        .find(|d| d.message == "expected a compound")
        .expect("missing particle options reported");
    let dust_end = text.find("dust").expect("dust in fixture") + "dust".len();
    assert_eq!(particle.range, Range::new(dust_end, dust_end + 1));

    assert!(checked.diagnostics.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn e2e_annotations_cover_checked_values() {
    let engine = common::engine();
    let text = common::load_fixture("pack/data/demo/loot_table/chest.json");
    let checked = check(&engine, "data/demo/loot_table/chest.json", &text);
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.diagnostics);
    assert!(checked.annotations.contains_key(&checked.root.id));
    assert!(checked.annotations.len() > 10, "only {} annotations", checked.annotations.len());
}

#[test]
fn e2e_completion_in_fixture_category() {
    let engine = common::engine();
    let text = r#"{"pools": [{"rolls": 1, "entries": [{"type": }]}]}"#;
    let offset = text.find(r#""type": "#).expect("type key") + r#""type": "#.len();
    let items = engine.complete_text(text, Grammar::Json, Some("data/demo/loot_table/new.json"), offset, None);

    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["minecraft:item", "minecraft:empty"]);
    assert_eq!(items[0].insert_text.as_deref(), Some(r#""minecraft:item""#));
    assert_eq!(items[0].range, Range::empty(offset));

    let completed = items[0].apply(text);
    let checked = check(&engine, "data/demo/loot_table/new.json", &completed);
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.diagnostics);
}

#[tokio::test(flavor = "multi_thread")]
async fn e2e_documents_check_concurrently() {
    let engine = Arc::new(common::engine());
    let documents = common::pack_documents();

    let mut tasks = Vec::new();
    for (relative, path) in documents.clone() {
        let engine = Arc::clone(&engine);
        tasks.push(tokio::task::spawn_blocking(move || {
            let text = fs::read_to_string(&path).expect("readable fixture");
            check(&engine, &relative, &text).diagnostics
        }));
    }

    for ((relative, path), task) in documents.into_iter().zip(tasks) {
        let concurrent = task.await.expect("check task");
        let text = fs::read_to_string(&path).expect("readable fixture");
        let sequential = check(&engine, &relative, &text).diagnostics;
        assert_eq!(concurrent, sequential, "{}", relative);
    }
}
