//! Completion items and the shared record and collection completers
//!
//! Completers are registered per node tag. [`complete`] walks the selection
//! chain at the cursor from the innermost node outwards and asks the first
//! node with a completer.

pub mod json;
pub mod nbt;
pub mod resource;

use once_cell::sync::Lazy;
use quill_ast::{selected_leaf, AstNode, NodeKind, Range};
use quill_parser::primitive::UNQUOTABLE_PATTERN;
use quill_schema::StructField;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::mcdoc::{item_type, snippet, struct_fields, value_items};
use crate::CompleterContext;

/// Characters that should trigger completion in JSON documents
pub const JSON_TRIGGER_CHARACTERS: [char; 3] = ['\n', ':', '"'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Value,
    Field,
    Property,
}

/// A suggestion for the text at `range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionItem {
    pub label: String,
    pub range: Range,
    /// Snippet text (`$1`, `${1:default}`, `${1|a,b|}` placeholders); `label` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
    pub kind: CompletionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{\d+:([^}]*)\}|\$\{\d+\|([^,|]*)[^}]*\}|\$\d+").unwrap());

impl CompletionItem {
    pub fn new(label: impl Into<String>, range: Range, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            range,
            insert_text: None,
            kind,
            detail: None,
            deprecated: false,
            sort_text: None,
            filter_text: None,
        }
    }

    pub fn value(label: impl Into<String>, range: Range) -> Self {
        Self::new(label, range, CompletionKind::Value)
    }

    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Text inserted by an editor without snippet support: placeholders
    /// become their default (or first choice), tab stops disappear
    pub fn plain_text(&self) -> String {
        let text = self.insert_text.as_deref().unwrap_or(&self.label);
        PLACEHOLDER
            .replace_all(text, |caps: &regex::Captures<'_>| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .map_or(String::new(), |m| m.as_str().to_string())
            })
            .into_owned()
    }

    /// Apply the item to `text` as an editor would, without snippet support
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..self.range.start]);
        out.push_str(&self.plain_text());
        out.push_str(&text[self.range.end..]);
        out
    }
}

/// Completions for the cursor at `offset` in `root`
pub fn complete(root: &AstNode, offset: usize, ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    let Some(selection) = selected_leaf(root, offset) else {
        return Vec::new();
    };
    let chain: Vec<&AstNode> = std::iter::once(selection.leaf)
        .chain(selection.parents.iter().copied())
        .collect();

    for (i, node) in chain.iter().enumerate() {
        if let Some(completer) = ctx.meta.completer(node.kind.tag()) {
            let items = completer(node, &chain[i + 1..], ctx);
            tracing::trace!(tag = node.kind.tag(), items = items.len(), "completed");
            return items;
        }
    }
    Vec::new()
}

/// Notation the inserted text is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Snbt,
    Json,
}

impl Style {
    /// Render `value` as a key or string literal
    pub fn quote(self, value: &str) -> String {
        match self {
            Style::Snbt if UNQUOTABLE_PATTERN.is_match(value) => value.to_string(),
            _ => serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value)),
        }
    }
}

// === Record completion ===

/// Completions for a cursor directly inside a compound or object, outside any pair
pub(crate) fn record(compound: &AstNode, style: Style, ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    let offset = ctx.offset;
    if let Some(pair) = compound
        .pairs()
        .find(|pair| pair.range.contains_inclusive(offset))
    {
        if in_value_slot(pair, offset) {
            return field_values(compound, pair, None, style, ctx);
        }
        if let Some(key) = pair.pair_key() {
            return record_keys(compound, Some(pair), key.range, style, ctx);
        }
    }
    if ctx.trigger == Some(':') {
        return Vec::new();
    }
    record_keys(compound, None, Range::empty(offset), style, ctx)
}

/// Completions for a string or number node inside a compound: the key itself, or a field value
pub(crate) fn record_member(
    node: &AstNode,
    parents: &[&AstNode],
    style: Style,
    ctx: &CompleterContext<'_>,
) -> Option<Vec<CompletionItem>> {
    let (pair, compound) = match parents {
        [pair, compound, ..] if matches!(pair.kind, NodeKind::Pair(_)) => (*pair, *compound),
        _ => return None,
    };
    if pair.pair_key().is_some_and(|key| key.range == node.range) {
        return Some(record_keys(compound, Some(pair), node.range, style, ctx));
    }
    Some(field_values(compound, pair, Some(node), style, ctx))
}

/// Key completions; `pair` is the pair being edited, if any
fn record_keys(
    compound: &AstNode,
    pair: Option<&AstNode>,
    range: Range,
    style: Style,
    ctx: &CompleterContext<'_>,
) -> Vec<CompletionItem> {
    let Some(ty) = ctx.annotation(compound.id) else {
        return Vec::new();
    };
    let fields = struct_fields(ty, ctx.schema);

    let existing: Vec<&str> = compound
        .pairs()
        .filter(|other| pair.map_or(true, |pair| other.range != pair.range))
        .filter_map(|other| other.pair_key().and_then(|key| key.string_value()))
        .collect();
    let has_sep = pair.is_some_and(|pair| matches!(&pair.kind, NodeKind::Pair(p) if p.sep.is_some()));
    let has_later_pair = compound.pairs().any(|other| other.range.start > range.end);

    fields
        .iter()
        .filter(|field| !existing.contains(&field.key.as_str()))
        .map(|field| {
            let key = style.quote(&field.key);
            let mut insert = if has_sep {
                key.clone()
            } else {
                format!("{}: {}", key, snippet(&field.ty, ctx.schema, style))
            };
            if !has_sep && has_later_pair {
                insert.push(',');
            }
            key_item(field, range, key, insert)
        })
        .collect()
}

fn key_item(field: &StructField, range: Range, key: String, insert: String) -> CompletionItem {
    let rank = if field.deprecated {
        '2'
    } else if field.optional {
        '1'
    } else {
        '0'
    };
    CompletionItem {
        insert_text: Some(insert),
        detail: Some(field.ty.to_string()),
        deprecated: field.deprecated,
        sort_text: Some(format!("{}{}", rank, field.key)),
        filter_text: Some(key),
        ..CompletionItem::new(field.key.clone(), range, CompletionKind::Field)
    }
}

/// Value completions for the field of `pair`; replaces `value` when present
fn field_values(
    compound: &AstNode,
    pair: &AstNode,
    value: Option<&AstNode>,
    style: Style,
    ctx: &CompleterContext<'_>,
) -> Vec<CompletionItem> {
    let range = match value {
        Some(value) => value.range,
        None => Range::empty(ctx.offset),
    };
    let annotated = value.and_then(|value| ctx.annotation(value.id)).cloned();
    let ty = annotated.or_else(|| {
        let key = pair.pair_key()?.string_value()?;
        let fields = struct_fields(ctx.annotation(compound.id)?, ctx.schema);
        fields.into_iter().find(|field| field.key == key).map(|field| field.ty)
    });
    match ty {
        Some(ty) => value_items(&ty, ctx.schema, style, range),
        None => Vec::new(),
    }
}

/// Cursor sits after the separator of a pair that has no usable value yet
fn in_value_slot(pair: &AstNode, offset: usize) -> bool {
    let NodeKind::Pair(payload) = &pair.kind else {
        return false;
    };
    let Some(sep) = payload.sep else {
        return false;
    };
    offset >= sep.end
        && pair
            .pair_value()
            .map_or(true, |value| matches!(value.kind, NodeKind::Error))
}

// === Collection completion ===

/// Item completions for a cursor inside a list or array, between items
pub(crate) fn collection(list: &AstNode, style: Style, ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    let Some(ty) = ctx.annotation(list.id) else {
        return Vec::new();
    };
    let Some(item) = item_type(ty, ctx.schema) else {
        return Vec::new();
    };
    let offset = ctx.offset;
    let has_later_item = list.children.iter().any(|child| child.range.start > offset);
    let mut items = value_items(&item, ctx.schema, style, Range::empty(offset));
    if has_later_item {
        for item in &mut items {
            let text = item.insert_text.take().unwrap_or_else(|| item.label.clone());
            item.insert_text = Some(format!("{},", text));
        }
    }
    items
}

/// Value completions for a primitive list item
pub(crate) fn collection_item(node: &AstNode, list: &AstNode, style: Style, ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    let ty = ctx
        .annotation(node.id)
        .cloned()
        .or_else(|| item_type(ctx.annotation(list.id)?, ctx.schema));
    match ty {
        Some(ty) => value_items(&ty, ctx.schema, style, node.range),
        None => Vec::new(),
    }
}

/// Shared body of the SNBT and JSON primitive completers
pub(crate) fn primitive(
    node: &AstNode,
    parents: &[&AstNode],
    style: Style,
    ctx: &CompleterContext<'_>,
) -> Vec<CompletionItem> {
    if let Some(items) = record_member(node, parents, style, ctx) {
        return items;
    }
    match parents.first() {
        Some(list) if matches!(list.kind, NodeKind::NbtList | NodeKind::NbtArray(_) | NodeKind::JsonArray) => {
            collection_item(node, list, style, ctx)
        }
        _ => match ctx.annotation(node.id) {
            Some(ty) => value_items(ty, ctx.schema, style, node.range),
            None => Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_strips_placeholders() {
        let item = CompletionItem::value("a", Range::new(0, 0)).with_insert_text(r#""a": ${1:0}"#);
        assert_eq!(item.plain_text(), r#""a": 0"#);

        let item = CompletionItem::value("{}", Range::new(0, 0)).with_insert_text("{$1}");
        assert_eq!(item.plain_text(), "{}");

        let item = CompletionItem::value("b", Range::new(0, 0)).with_insert_text("b: ${1|false,true|}");
        assert_eq!(item.plain_text(), "b: false");
    }

    #[test]
    fn test_apply_replaces_range() {
        let item = CompletionItem::value("stone", Range::new(5, 7)).with_insert_text("stone");
        assert_eq!(item.apply("{id: st}"), "{id: stone}");
    }

    #[test]
    fn test_quote_keys() {
        assert_eq!(Style::Snbt.quote("Count"), "Count");
        assert_eq!(Style::Snbt.quote("minecraft:id"), r#""minecraft:id""#);
        assert_eq!(Style::Json.quote("a"), r#""a""#);
    }

    #[test]
    fn test_key_before_later_pair_gets_comma() {
        use crate::{build_default_registry, Annotations};
        use quill_ast::{set_parents, NumericKind};
        use quill_parser::command::CommandTree;
        use quill_parser::{parse_document, Grammar};
        use quill_schema::{McdocType, SchemaTable, StructField, TagTable};

        let mut root = parse_document("{ Age: 1}", Grammar::Snbt, &CommandTree::default(), None).root;
        set_parents(&mut root);
        let ty = McdocType::structure(vec![
            StructField::optional("Age", McdocType::numeric(NumericKind::Int)),
            StructField::optional("Saddle", McdocType::Boolean),
        ]);
        let annotations = Annotations::from([(root.id, ty)]);
        let (meta, schema, tags) = (build_default_registry(), SchemaTable::new(), TagTable::new());
        let ctx = CompleterContext {
            offset: 1,
            meta: &meta,
            schema: &schema,
            registry: &tags,
            annotations: &annotations,
            trigger: None,
        };

        let items = complete(&root, 1, &ctx);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Saddle");
        assert_eq!(items[0].insert_text.as_deref(), Some("Saddle: ${1|false,true|},"));
        assert_eq!(items[0].range, Range::empty(1));
    }
}
