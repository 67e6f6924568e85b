//! Value suggestions and snippet skeletons for type descriptors

use quill_ast::{resource, NumericKind, Range};
use quill_parser::snbt::format_number;
use quill_schema::{McdocType, ParallelIndex, SchemaService, StructField};

use crate::completion::{CompletionItem, Style};

const MAX_DEPTH: usize = 16;

/// Concrete members of `ty`: references, static dispatchers and unions are expanded
fn flatten(ty: &McdocType, schema: &dyn SchemaService, depth: usize, out: &mut Vec<McdocType>) {
    if depth > MAX_DEPTH {
        return;
    }
    match ty {
        McdocType::Any => {}
        McdocType::Reference { path } => {
            if let Some(resolved) = schema.resolve_reference(path) {
                flatten(&resolved, schema, depth + 1, out);
            }
        }
        McdocType::Union { members } => {
            for member in members {
                flatten(member, schema, depth + 1, out);
            }
        }
        McdocType::Dispatcher {
            registry,
            parallel_indices,
        } => {
            for index in parallel_indices {
                if let ParallelIndex::Static(key) = index {
                    if let Some(member) = schema.dispatch(registry, &resource::lengthen(key)) {
                        flatten(&member, schema, depth + 1, out);
                    }
                }
            }
        }
        concrete => out.push(concrete.clone()),
    }
}

fn members(ty: &McdocType, schema: &dyn SchemaService) -> Vec<McdocType> {
    let mut out = Vec::new();
    flatten(ty, schema, 0, &mut out);
    out
}

/// Fields of every struct member of `ty`; the first definition of a key wins
pub fn struct_fields(ty: &McdocType, schema: &dyn SchemaService) -> Vec<StructField> {
    let mut fields: Vec<StructField> = Vec::new();
    for member in members(ty, schema) {
        if let McdocType::Struct { fields: more } = member {
            for field in more {
                if !fields.iter().any(|f| f.key == field.key) {
                    fields.push(field);
                }
            }
        }
    }
    fields
}

/// Item type of the first list or array member of `ty`
pub fn item_type(ty: &McdocType, schema: &dyn SchemaService) -> Option<McdocType> {
    members(ty, schema).into_iter().find_map(|member| match member {
        McdocType::List { item, .. } => Some(*item),
        McdocType::Array { kind, .. } => Some(McdocType::numeric(kind)),
        _ => None,
    })
}

/// Suggested values for a slot of type `ty`, replacing `range`.
///
/// Union members contribute their suggestions in order, de-duplicated by label.
pub fn value_items(ty: &McdocType, schema: &dyn SchemaService, style: Style, range: Range) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = Vec::new();
    for member in members(ty, schema) {
        for item in member_items(&member, style, range) {
            if !items.iter().any(|existing| existing.label == item.label) {
                items.push(item.with_detail(member.to_string()));
            }
        }
    }
    items
}

fn member_items(ty: &McdocType, style: Style, range: Range) -> Vec<CompletionItem> {
    let item = |label: &str, insert: String| CompletionItem::value(label, range).with_insert_text(insert);
    match ty {
        McdocType::Boolean => vec![item("false", "false".into()), item("true", "true".into())],
        McdocType::String { pool: Some(pool), .. } => pool
            .iter()
            .map(|value| item(value, style.quote(value)))
            .collect(),
        McdocType::String { pool: None, .. } => vec![item("\"\"", "\"$1\"".into())],
        McdocType::Numeric { kind, range: bounds } => {
            let zero = bounds
                .and_then(|b| b.min)
                .filter(|min| *min > 0.0)
                .unwrap_or(0.0);
            vec![item(&number_label(zero, *kind, style), numeric_snippet(zero, *kind, style))]
        }
        McdocType::Struct { .. } => vec![item("{}", "{$1}".into())],
        McdocType::List { .. } => vec![item("[]", "[$1]".into())],
        McdocType::Array { kind, .. } => {
            let prefix = array_prefix(*kind);
            vec![item(&format!("[{};]", prefix), format!("[{};$1]", prefix))]
        }
        _ => Vec::new(),
    }
}

/// Placeholder text for a value of type `ty`, inserted after a completed key
pub fn snippet(ty: &McdocType, schema: &dyn SchemaService, style: Style) -> String {
    let Some(first) = members(ty, schema).into_iter().next() else {
        return "$1".to_string();
    };
    match &first {
        McdocType::Boolean => "${1|false,true|}".to_string(),
        McdocType::String { pool: Some(pool), .. } if !pool.is_empty() => {
            let choices: Vec<String> = pool.iter().map(|value| style.quote(value).replace(',', "\\,")).collect();
            format!("${{1|{}|}}", choices.join(","))
        }
        McdocType::String { .. } => "\"$1\"".to_string(),
        McdocType::Numeric { kind, range } => {
            let zero = range.and_then(|r| r.min).filter(|min| *min > 0.0).unwrap_or(0.0);
            numeric_snippet(zero, *kind, style)
        }
        McdocType::Struct { .. } => "{$1}".to_string(),
        McdocType::List { .. } => "[$1]".to_string(),
        McdocType::Array { kind, .. } => format!("[{};$1]", array_prefix(*kind)),
        _ => "$1".to_string(),
    }
}

fn number_label(value: f64, kind: NumericKind, style: Style) -> String {
    match style {
        Style::Snbt => format_number(value, kind),
        Style::Json => value.to_string(),
    }
}

/// `${1:0}` with the SNBT type suffix after the placeholder
fn numeric_snippet(value: f64, kind: NumericKind, style: Style) -> String {
    let rendered = number_label(value, kind, style);
    let digits = value.to_string();
    let suffix = rendered.strip_prefix(&digits).unwrap_or("");
    format!("${{1:{}}}{}", digits, suffix)
}

fn array_prefix(kind: NumericKind) -> char {
    match kind {
        NumericKind::Byte => 'B',
        NumericKind::Long => 'L',
        _ => 'I',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_schema::{NumericRange, SchemaTable};

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn test_union_values_are_deduplicated() {
        let schema = SchemaTable::new();
        let ty = McdocType::union(vec![
            McdocType::Boolean,
            McdocType::string_pool(["true", "maybe"]),
            McdocType::Boolean,
        ]);
        let items = value_items(&ty, &schema, Style::Json, Range::empty(0));
        assert_eq!(labels(&items), vec!["false", "true", "maybe"]);
        assert_eq!(items[2].insert_text.as_deref(), Some(r#""maybe""#));
    }

    #[test]
    fn test_numeric_suffixes() {
        let schema = SchemaTable::new();
        let byte = McdocType::numeric(NumericKind::Byte);
        assert_eq!(snippet(&byte, &schema, Style::Snbt), "${1:0}b");
        assert_eq!(snippet(&byte, &schema, Style::Json), "${1:0}");
        let double = McdocType::numeric(NumericKind::Double);
        assert_eq!(snippet(&double, &schema, Style::Snbt), "${1:0}.0");

        let count = McdocType::numeric_in(NumericKind::Int, NumericRange::between(1.0, 64.0));
        let items = value_items(&count, &schema, Style::Snbt, Range::empty(0));
        assert_eq!(labels(&items), vec!["1"]);
    }

    #[test]
    fn test_struct_fields_merge_union_members() {
        let mut schema = SchemaTable::new();
        schema.insert_type(
            "test:range",
            McdocType::structure(vec![StructField::optional("min", McdocType::numeric(NumericKind::Int))]),
        );
        let ty = McdocType::union(vec![
            McdocType::numeric(NumericKind::Int),
            McdocType::reference("test:range"),
            McdocType::structure(vec![
                StructField::optional("max", McdocType::numeric(NumericKind::Int)),
                StructField::required("min", McdocType::Boolean),
            ]),
        ]);
        let keys: Vec<_> = struct_fields(&ty, &schema).into_iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["min", "max"]);
    }

    #[test]
    fn test_static_dispatch_resolves_member() {
        let mut schema = SchemaTable::new();
        schema.insert_dispatch("test:reg", "a", McdocType::list(McdocType::string()));
        let ty = McdocType::dispatch_static("test:reg", "a");
        assert_eq!(item_type(&ty, &schema), Some(McdocType::string()));
        assert_eq!(snippet(&ty, &schema, Style::Snbt), "[$1]");
    }

    #[test]
    fn test_string_pool_snippet() {
        let schema = SchemaTable::new();
        let ty = McdocType::string_pool(["red", "light blue"]);
        assert_eq!(snippet(&ty, &schema, Style::Snbt), r#"${1|red,"light blue"|}"#);
    }
}
