//! Integration tests for checking and completing whole documents

use quill_ast::{find_node, AstNode, NodeKind, Range, Severity};
use quill_checker::{CancellationFlag, CompletionItem, Engine, Project};
use quill_parser::Grammar;
use quill_schema::{parse_schema, McdocType, SchemaTable, TagTable};

const SCHEMA: &str = r#"
struct Pig {
    Saddle?: boolean,
    Age?: int,
}
struct Cow {
    Age?: int,
    #[deprecated] Milked?: boolean,
}
struct StickData {
    power: string,
}
struct Pool {
    pools: [struct { rolls: int @ 1.., }],
}
dispatch minecraft:entity[pig] to Pig
dispatch minecraft:entity[cow] to Cow
dispatch mcdoc:custom_item_data[stick] to StickData
"#;

fn engine() -> Engine {
    let schema: SchemaTable = parse_schema(SCHEMA).expect("schema should parse");
    let mut tags = TagTable::new();
    tags.insert_tag("tag/entity_type", "farm", ["cow", "pig"]);
    tags.insert_registry("entity_type", ["minecraft:cow", "minecraft:pig"]);

    let mut project = Project::default();
    project
        .categories
        .insert("loot_table".into(), McdocType::reference("Pool"));
    project.categories.insert(
        "test".into(),
        McdocType::structure(vec![quill_schema::StructField::required(
            "a",
            McdocType::numeric(quill_ast::NumericKind::Int),
        )]),
    );
    Engine::new(schema, tags, project)
}

fn messages(engine: &Engine, text: &str, grammar: Grammar, path: Option<&str>) -> Vec<String> {
    engine
        .check_text(text, grammar, path, None)
        .diagnostics
        .into_iter()
        .map(|d| d.message)
        .collect()
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_str()).collect()
}

// === Commands ===

#[test]
fn test_selector_nbt_uses_entity_type() {
    let engine = engine();
    assert_eq!(
        messages(&engine, "kill @e[type=pig,nbt={Saddle: 2b}]", Grammar::Command, None),
        vec!["expected a boolean"]
    );
    assert!(messages(&engine, "kill @e[type=pig,nbt={Saddle: 1b}]", Grammar::Command, None).is_empty());
}

#[test]
fn test_selector_nbt_with_tag_checks_union() {
    let engine = engine();
    // Saddle only exists on pigs; the cow member would warn about it
    assert!(messages(&engine, "kill @e[type=#farm,nbt={Saddle: 1b}]", Grammar::Command, None).is_empty());
    assert_eq!(
        messages(&engine, "kill @e[type=#farm,nbt={Age: 1b}]", Grammar::Command, None),
        vec!["expected an int"]
    );
}

#[test]
fn test_deprecated_key_is_a_hint() {
    let engine = engine();
    let doc = engine.check_text("kill @e[type=cow,nbt={Milked: 1b}]", Grammar::Command, None, None);
    assert_eq!(doc.diagnostics.len(), 1);
    assert_eq!(doc.diagnostics[0].message, "deprecated key Milked");
    assert_eq!(doc.diagnostics[0].severity, Severity::Hint);
}

#[test]
fn test_custom_data_string_is_checked_in_place() {
    let engine = engine();
    let text = r#"give @s stick[custom_data="{power: 1b}"]"#;
    let doc = engine.check_text(text, Grammar::Command, None, None);
    assert_eq!(doc.diagnostics.len(), 1, "{:?}", doc.diagnostics);
    assert_eq!(doc.diagnostics[0].message, "expected a string");
    assert_eq!(doc.diagnostics[0].range, Range::new(35, 37));
    assert_eq!(&text[35..37], "1b");

    let string = find_string(&doc.root).expect("custom data string");
    let embedded = &string.children[0];
    assert_eq!(embedded.kind, NodeKind::NbtCompound);
    assert_eq!(embedded.parent, Some(string.id));
    assert_eq!(embedded.range, Range::new(27, 38));
    let value = &embedded.children[0].children[1];
    assert!(!value.id.is_detached());
    assert_eq!(find_node(&doc.root, value.id).map(|n| n.range), Some(value.range));
    assert!(doc.annotations.contains_key(&value.id));
}

#[test]
fn test_custom_data_compound_uses_item_data() {
    let engine = engine();
    let text = "give @s stick[custom_data={power: 1b}]";
    let doc = engine.check_text(text, Grammar::Command, None, None);
    assert_eq!(doc.diagnostics.len(), 1, "{:?}", doc.diagnostics);
    assert_eq!(doc.diagnostics[0].message, "expected a string");
    assert_eq!(&text[doc.diagnostics[0].range.start..doc.diagnostics[0].range.end], "1b");

    assert!(messages(&engine, r#"give @s stick[custom_data={power: "max"}]"#, Grammar::Command, None).is_empty());
}

#[test]
fn test_custom_data_syntax_errors_are_remapped() {
    let engine = engine();
    let text = r#"give @s stick[custom_data="{power: }"]"#;
    let doc = engine.check_text(text, Grammar::Command, None, None);
    let syntax: Vec<_> = doc
        .diagnostics
        .iter()
        .filter(|d| d.message.starts_with("expected a value"))
        .collect();
    assert_eq!(syntax.len(), 1, "{:?}", doc.diagnostics);
    assert!(syntax[0].range.start >= 27 && syntax[0].range.end <= 37);
}

fn find_string(node: &AstNode) -> Option<&AstNode> {
    if node.kind.is_string() && !node.children.is_empty() {
        return Some(node);
    }
    node.children.iter().find_map(find_string)
}

#[test]
fn test_cancelled_check_keeps_syntax_diagnostics() {
    let engine = engine();
    let cancel = CancellationFlag::new();
    cancel.cancel();
    let doc = engine.check_text(
        "kill @e[type=pig,nbt={Saddle: 2b}]\nfrobnicate",
        Grammar::Command,
        None,
        Some(cancel),
    );
    let messages: Vec<_> = doc.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["unknown command"]);
    assert!(doc.annotations.is_empty());
}

// === JSON documents ===

#[test]
fn test_loot_table_category() {
    let engine = engine();
    let path = Some("data/foo/loot_table/chest.json");
    assert!(messages(&engine, r#"{"pools": [{"rolls": 2}]}"#, Grammar::Json, path).is_empty());
    assert_eq!(
        messages(&engine, r#"{"pools": [{"rolls": 0}]}"#, Grammar::Json, path),
        vec!["expected a value in range 1.."]
    );
}

#[test]
fn test_json_completion_round_trip() {
    let engine = engine();
    let path = Some("data/foo/test/a.json");
    let items = engine.complete_text("{}", Grammar::Json, path, 1, None);
    assert_eq!(labels(&items), vec!["a"]);
    assert_eq!(items[0].insert_text.as_deref(), Some(r#""a": ${1:0}"#));
    assert_eq!(items[0].plain_text(), r#""a": 0"#);
    assert_eq!(items[0].sort_text.as_deref(), Some("0a"));

    let completed = items[0].apply("{}");
    assert_eq!(completed, r#"{"a": 0}"#);
    assert!(messages(&engine, &completed, Grammar::Json, path).is_empty());
}

#[test]
fn test_json_value_slot_completion() {
    let engine = engine();
    let path = Some("data/foo/loot_table/a.json");
    let text = r#"{"pools": }"#;
    let items = engine.complete_text(text, Grammar::Json, path, 10, Some(':'));
    assert_eq!(labels(&items), vec!["[]"]);
    assert_eq!(items[0].range, Range::new(10, 10));
}

// === SNBT completion inside commands ===

#[test]
fn test_snbt_completion_skips_present_keys() {
    let engine = engine();
    let text = "summon pig ~ ~ ~ {Age: 1, }";
    let items = engine.complete_text(text, Grammar::Command, None, 25, None);
    assert_eq!(labels(&items), vec!["Saddle"]);
    assert_eq!(items[0].insert_text.as_deref(), Some("Saddle: ${1|false,true|}"));
    assert_eq!(items[0].range, Range::new(26, 26));
}

#[test]
fn test_snbt_key_completion_replaces_typed_key() {
    let engine = engine();
    let text = "summon cow ~ ~ ~ {Mi: 1b, Age: 1}";
    let items = engine.complete_text(text, Grammar::Command, None, 20, None);
    assert_eq!(labels(&items), vec!["Milked"]);
    assert!(items[0].deprecated);
    assert_eq!(items[0].sort_text.as_deref(), Some("2Milked"));
    assert_eq!(items[0].insert_text.as_deref(), Some("Milked"));
    assert_eq!(items[0].range, Range::new(18, 20));
}

#[test]
fn test_resource_completion_lists_registry() {
    let engine = engine();
    let items = engine.complete_text("summon p", Grammar::Command, None, 8, None);
    assert_eq!(labels(&items), vec!["minecraft:cow", "minecraft:pig"]);
    assert_eq!(items[0].range, Range::new(7, 8));
}
