//! Validation of SNBT and JSON values against type descriptors

use std::mem;

use quill_ast::{resource, AstNode, Diagnostic, NodeKind, NumericKind, Range, Severity, MAX_NESTING};
use quill_schema::{McdocType, NumericRange, ParallelIndex, StructField};

use crate::{Annotations, CheckError, CheckerContext};

/// References resolved on one value deeper than this are treated as unresolved
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Predicates match partially: required keys may be absent
    pub is_predicate: bool,
}

/// Shape of a value node, independent of the grammar it came from
#[derive(Debug, Clone, Copy)]
enum Value<'n> {
    Number { value: f64, kind: Option<NumericKind> },
    Boolean,
    String(&'n str),
    Compound,
    List,
    Array(NumericKind),
    Null,
    /// Syntax error placeholder; already reported by the parser
    Invalid,
    Other,
}

impl<'n> Value<'n> {
    fn of(node: &'n AstNode) -> Self {
        match &node.kind {
            NodeKind::NbtNumber(n) => Value::Number {
                value: n.value,
                kind: Some(n.kind),
            },
            NodeKind::JsonNumber(value) => Value::Number {
                value: *value,
                kind: None,
            },
            NodeKind::JsonBoolean(_) => Value::Boolean,
            NodeKind::NbtString(s) | NodeKind::JsonString(s) | NodeKind::String(s) => Value::String(&s.value),
            NodeKind::NbtCompound | NodeKind::JsonObject => Value::Compound,
            NodeKind::NbtList | NodeKind::JsonArray => Value::List,
            NodeKind::NbtArray(kind) => Value::Array(*kind),
            NodeKind::JsonNull => Value::Null,
            NodeKind::Error => Value::Invalid,
            _ => Value::Other,
        }
    }
}

/// Validate `node` against `ty`, reporting to and annotating `ctx`
pub fn check_type(node: &AstNode, ty: &McdocType, ctx: &mut CheckerContext<'_>, options: CheckOptions) {
    check(
        node,
        ty,
        ctx,
        Env {
            options,
            depth: 0,
            level: 0,
            siblings: None,
        },
    );
}

/// Validate against the member(s) of `registry` selected by `keys`.
///
/// Several keys validate against the union of their members. An empty key
/// list or keys with no registered member fall back to the registry's
/// `%fallback` member, or no constraint.
pub fn check_dispatch(
    node: &AstNode,
    registry: &str,
    keys: &[String],
    ctx: &mut CheckerContext<'_>,
    options: CheckOptions,
) {
    if let Some(ty) = dispatch_type(ctx, registry, keys) {
        check_type(node, &ty, ctx, options);
    }
}

const FALLBACK_KEY: &str = "%fallback";

fn dispatch_type(ctx: &CheckerContext<'_>, registry: &str, keys: &[String]) -> Option<McdocType> {
    let mut members: Vec<McdocType> = keys
        .iter()
        .filter_map(|key| ctx.schema.dispatch(registry, &resource::lengthen(key)))
        .collect();
    match members.len() {
        0 => ctx.schema.dispatch(registry, FALLBACK_KEY),
        1 => members.pop(),
        _ => Some(McdocType::union(members)),
    }
}

#[derive(Clone, Copy)]
struct Env<'s> {
    options: CheckOptions,
    /// References resolved without descending into a child value
    depth: usize,
    /// Values descended into from the checked root
    level: usize,
    /// Compound whose field is being checked, for `[[field]]` dispatch keys
    siblings: Option<&'s AstNode>,
}

impl<'s> Env<'s> {
    fn nested(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    fn descend(self) -> Self {
        Self {
            depth: 0,
            level: self.level + 1,
            ..self
        }
    }

    fn in_struct(self, compound: &'s AstNode) -> Self {
        Self {
            siblings: Some(compound),
            ..self
        }
    }

    fn detached(self) -> Self {
        Self { siblings: None, ..self }
    }
}

fn check(node: &AstNode, ty: &McdocType, ctx: &mut CheckerContext<'_>, env: Env<'_>) {
    if ctx.cancel.is_cancelled() {
        return;
    }
    if env.level > MAX_NESTING {
        tracing::debug!(range = ?node.range, "value nested too deeply");
        return;
    }
    let value = Value::of(node);
    if matches!(value, Value::Invalid) {
        return;
    }

    match ty {
        McdocType::Any => ctx.annotate(node.id, ty),
        McdocType::Reference { path } => match ctx.schema.resolve_reference(path) {
            Some(resolved) if env.depth < MAX_DEPTH => check(node, &resolved, ctx, env.nested()),
            Some(_) => tracing::debug!(%path, "reference nested too deeply"),
            None => tracing::trace!(%path, "unresolved reference"),
        },
        McdocType::Dispatcher {
            registry,
            parallel_indices,
        } => {
            let Some(keys) = dispatch_keys(parallel_indices, env.siblings) else {
                return;
            };
            if let Some(resolved) = dispatch_type(ctx, registry, &keys) {
                if env.depth < MAX_DEPTH {
                    check(node, &resolved, ctx, env.nested());
                }
            }
        }
        McdocType::Union { members } => check_union(node, ty, members, ctx, env),
        _ => {
            ctx.annotate(node.id, ty);
            check_concrete(node, value, ty, ctx, env);
        }
    }
}

fn check_concrete(node: &AstNode, value: Value<'_>, ty: &McdocType, ctx: &mut CheckerContext<'_>, env: Env<'_>) {
    let expected = || CheckError::Expected {
        expected: ty.expectation().to_string(),
    };

    match (ty, value) {
        (McdocType::Boolean, Value::Boolean) => {}
        (McdocType::Boolean, Value::Number { value, kind: Some(NumericKind::Byte) }) if value == 0.0 || value == 1.0 => {}

        (McdocType::Numeric { kind, range }, Value::Number { value, kind: actual }) => {
            let kind_ok = match actual {
                Some(actual) => actual == *kind,
                None => !kind.is_integral() || value.fract() == 0.0,
            };
            if !kind_ok {
                ctx.report(expected(), node.range);
            } else if let Some(range) = range.filter(|r| !r.contains(value)) {
                ctx.report(CheckError::OutOfRange { range }, node.range);
            }
        }

        (McdocType::String { pool, length }, Value::String(s)) => {
            if let Some(pool) = pool {
                if !pool.iter().any(|candidate| candidate == s) {
                    ctx.report(
                        CheckError::NotInPool {
                            values: pool.join(", "),
                        },
                        node.range,
                    );
                    return;
                }
            }
            check_length(node, s.chars().count(), *length, ctx);
        }

        (McdocType::List { item, length }, Value::List) => {
            check_length(node, node.children.len(), *length, ctx);
            for child in &node.children {
                check(child, item, ctx, env.detached().descend());
            }
        }

        (McdocType::Array { kind, length }, Value::Array(actual)) if actual == *kind => {
            check_length(node, node.children.len(), *length, ctx);
            let item = McdocType::numeric(*kind);
            for child in &node.children {
                check(child, &item, ctx, env.detached().descend());
            }
        }

        (McdocType::Struct { fields }, Value::Compound) => check_struct(node, fields, ctx, env),

        _ => ctx.report(expected(), node.range),
    }
}

fn check_length(node: &AstNode, len: usize, length: Option<NumericRange>, ctx: &mut CheckerContext<'_>) {
    if let Some(range) = length.filter(|r| !r.contains(len as f64)) {
        ctx.report(CheckError::LengthOutOfRange { range }, node.range);
    }
}

fn check_struct(node: &AstNode, fields: &[StructField], ctx: &mut CheckerContext<'_>, env: Env<'_>) {
    let mut seen: Vec<&str> = Vec::new();
    for pair in node.pairs() {
        let Some(key_node) = pair.pair_key() else {
            continue;
        };
        let Some(key) = key_node.string_value() else {
            continue;
        };
        if seen.contains(&key) {
            ctx.report(CheckError::DuplicateKey { key: key.to_string() }, key_node.range);
            continue;
        }
        seen.push(key);

        let Some(field) = fields.iter().find(|field| field.key == key) else {
            ctx.report(CheckError::UnknownKey { key: key.to_string() }, key_node.range);
            continue;
        };
        if field.deprecated {
            ctx.report(CheckError::DeprecatedKey { key: key.to_string() }, key_node.range);
        }
        if let Some(value) = pair.pair_value() {
            check(value, &field.ty, ctx, env.in_struct(node).descend());
        }
    }

    if env.options.is_predicate {
        return;
    }
    let opening = Range::new(node.range.start, (node.range.start + 1).min(node.range.end));
    for field in fields.iter().filter(|field| !field.optional && !field.deprecated) {
        if !seen.contains(&field.key.as_str()) {
            ctx.report(
                CheckError::MissingKey {
                    key: field.key.clone(),
                },
                opening,
            );
        }
    }
}

fn check_union(node: &AstNode, ty: &McdocType, members: &[McdocType], ctx: &mut CheckerContext<'_>, env: Env<'_>) {
    if members.is_empty() {
        return;
    }

    // Members whose shape fits the value go first, so their errors win ties
    let value = Value::of(node);
    let (fitting, others): (Vec<&McdocType>, Vec<&McdocType>) =
        members.iter().partition(|member| fits_shape(value, member));

    // Ranked by (errors, all diagnostics); a member without any diagnostic ends the search
    let mut best: Option<((usize, usize), Vec<Diagnostic>, Annotations)> = None;
    for member in fitting.into_iter().chain(others) {
        let mark = ctx.err.mark();
        let outer = mem::take(&mut ctx.annotations);
        check(node, member, ctx, env);
        let reported = ctx.err.split_off(mark);
        let annotations = mem::replace(&mut ctx.annotations, outer);

        let errors = reported.iter().filter(|d| d.severity == Severity::Error).count();
        let rank = (errors, reported.len());
        let clean = reported.is_empty();
        if best.as_ref().map_or(true, |(fewest, _, _)| rank < *fewest) {
            best = Some((rank, reported, annotations));
        }
        if clean {
            break;
        }
    }

    if let Some((_, reported, annotations)) = best {
        ctx.err.extend(reported);
        ctx.annotations.extend(annotations);
    }
    ctx.annotate(node.id, ty);
}

/// Whether `value` has the outer shape of `ty`; unresolved types fit anything
fn fits_shape(value: Value<'_>, ty: &McdocType) -> bool {
    match ty {
        McdocType::Boolean => matches!(
            value,
            Value::Boolean | Value::Number { kind: Some(NumericKind::Byte), .. }
        ),
        McdocType::Numeric { .. } => matches!(value, Value::Number { .. }),
        McdocType::String { .. } => matches!(value, Value::String(_)),
        McdocType::List { .. } => matches!(value, Value::List),
        McdocType::Array { kind, .. } => matches!(value, Value::Array(actual) if actual == *kind),
        McdocType::Struct { .. } => matches!(value, Value::Compound),
        _ => true,
    }
}

/// Resolve parallel indices to registry keys; `None` when a field key is absent
fn dispatch_keys(indices: &[ParallelIndex], siblings: Option<&AstNode>) -> Option<Vec<String>> {
    indices
        .iter()
        .map(|index| match index {
            ParallelIndex::Static(key) => Some(key.clone()),
            ParallelIndex::Field(field) => sibling_value(siblings?, field),
        })
        .collect()
}

/// String or resource id value of the `field` pair of a compound
fn sibling_value(compound: &AstNode, field: &str) -> Option<String> {
    let pair = compound
        .pairs()
        .find(|pair| pair.pair_key().and_then(|k| k.string_value()) == Some(field))?;
    let value = pair.pair_value()?;
    match value.resource_location() {
        Some(id) => Some(id.to_full()),
        None => value.string_value().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_default_registry, MetaRegistry, Project};
    use pretty_assertions::assert_eq;
    use quill_ast::set_parents;
    use quill_parser::command::CommandTree;
    use quill_parser::{parse_document, Grammar};
    use quill_schema::{SchemaTable, TagTable};

    struct Fixture {
        meta: MetaRegistry,
        schema: SchemaTable,
        tags: TagTable,
        project: Project,
    }

    impl Fixture {
        fn new() -> Self {
            let mut schema = SchemaTable::new();
            schema.insert_type(
                "test:item",
                McdocType::structure(vec![
                    StructField::required("id", McdocType::string()),
                    StructField::optional("count", McdocType::numeric_in(NumericKind::Byte, NumericRange::between(1.0, 64.0))),
                    StructField::optional("Damage", McdocType::numeric(NumericKind::Int)).deprecated(),
                    StructField::optional(
                        "tag",
                        McdocType::Dispatcher {
                            registry: "test:item_tag".into(),
                            parallel_indices: vec![ParallelIndex::Field("id".into())],
                        },
                    ),
                ]),
            );
            schema.insert_dispatch(
                "test:item_tag",
                "minecraft:book",
                McdocType::structure(vec![StructField::required("pages", McdocType::list(McdocType::string()))]),
            );
            Self {
                meta: build_default_registry(),
                schema,
                tags: TagTable::new(),
                project: Project::default(),
            }
        }

        fn check(&self, text: &str, grammar: Grammar, ty: &McdocType, options: CheckOptions) -> (Vec<Diagnostic>, Annotations) {
            let doc = parse_document(text, grammar, &CommandTree::default(), None);
            assert!(doc.diagnostics.is_empty(), "syntax errors: {:?}", doc.diagnostics);
            let mut root = doc.root;
            set_parents(&mut root);
            let mut ctx = CheckerContext::new(&self.meta, &self.schema, &self.tags, &self.project);
            check_type(&root, ty, &mut ctx, options);
            (ctx.err.into_vec(), ctx.annotations)
        }
    }

    fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn test_struct_reports_missing_unknown_and_duplicate_keys() {
        let fixture = Fixture::new();
        let ty = McdocType::reference("test:item");
        let (diagnostics, _) = fixture.check("{count: 2b, foo: 1, count: 3b}", Grammar::Snbt, &ty, CheckOptions::default());
        assert_eq!(
            messages(&diagnostics),
            vec!["unknown key foo", "duplicate key count", "missing required key id"]
        );
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[2].range, Range::new(0, 1));
    }

    #[test]
    fn test_predicate_allows_missing_keys() {
        let fixture = Fixture::new();
        let ty = McdocType::reference("test:item");
        let options = CheckOptions { is_predicate: true };
        let (diagnostics, _) = fixture.check("{count: 2b}", Grammar::Snbt, &ty, options);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_numeric_kind_and_range() {
        let fixture = Fixture::new();
        let ty = McdocType::reference("test:item");
        let (diagnostics, _) = fixture.check(r#"{id: "a", count: 2}"#, Grammar::Snbt, &ty, CheckOptions::default());
        assert_eq!(messages(&diagnostics), vec!["expected a byte"]);
        let (diagnostics, _) = fixture.check(r#"{id: "a", count: 99b}"#, Grammar::Snbt, &ty, CheckOptions::default());
        assert_eq!(messages(&diagnostics), vec!["expected a value in range 1..64"]);
    }

    #[test]
    fn test_json_integral_numbers() {
        let fixture = Fixture::new();
        let ty = McdocType::numeric(NumericKind::Int);
        let (diagnostics, _) = fixture.check("1.5", Grammar::Json, &ty, CheckOptions::default());
        assert_eq!(messages(&diagnostics), vec!["expected an int"]);
        let (diagnostics, _) = fixture.check("3", Grammar::Json, &ty, CheckOptions::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_deprecated_key_is_a_hint() {
        let fixture = Fixture::new();
        let ty = McdocType::reference("test:item");
        let (diagnostics, _) = fixture.check(r#"{id: "a", Damage: 1}"#, Grammar::Snbt, &ty, CheckOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Hint);
    }

    #[test]
    fn test_field_dispatch_uses_sibling_value() {
        let fixture = Fixture::new();
        let ty = McdocType::reference("test:item");
        let (diagnostics, _) = fixture.check(
            r#"{id: "minecraft:book", tag: {pages: [1]}}"#,
            Grammar::Snbt,
            &ty,
            CheckOptions::default(),
        );
        assert_eq!(messages(&diagnostics), vec!["expected a string"]);

        let (diagnostics, _) = fixture.check(r#"{id: "stick", tag: {pages: [1]}}"#, Grammar::Snbt, &ty, CheckOptions::default());
        assert!(diagnostics.is_empty(), "unresolved key means no constraint");
    }

    #[test]
    fn test_union_accepts_first_clean_member() {
        let fixture = Fixture::new();
        let ty = McdocType::union(vec![
            McdocType::numeric(NumericKind::Int),
            McdocType::structure(vec![StructField::optional("min", McdocType::numeric(NumericKind::Int))]),
        ]);
        let (diagnostics, annotations) = fixture.check("{min: 1}", Grammar::Snbt, &ty, CheckOptions::default());
        assert!(diagnostics.is_empty());
        assert_eq!(annotations.values().filter(|t| **t == ty).count(), 1);
        assert!(annotations.values().any(|t| *t == McdocType::numeric(NumericKind::Int)));
    }

    #[test]
    fn test_union_reports_best_member() {
        let fixture = Fixture::new();
        let ty = McdocType::union(vec![
            McdocType::structure(vec![
                StructField::required("a", McdocType::numeric(NumericKind::Int)),
                StructField::required("b", McdocType::numeric(NumericKind::Int)),
            ]),
            McdocType::structure(vec![
                StructField::optional("min", McdocType::numeric(NumericKind::Int)),
                StructField::optional("max", McdocType::numeric(NumericKind::Int)),
            ]),
        ]);
        let (diagnostics, _) = fixture.check(r#"{min: 1, max: "x"}"#, Grammar::Snbt, &ty, CheckOptions::default());
        assert_eq!(messages(&diagnostics), vec!["expected an int"]);
        assert_eq!(diagnostics[0].range, Range::new(14, 17));
    }

    #[test]
    fn test_union_prefers_member_without_warnings() {
        let fixture = Fixture::new();
        let ty = McdocType::union(vec![
            McdocType::structure(vec![StructField::optional("a", McdocType::numeric(NumericKind::Int))]),
            McdocType::structure(vec![StructField::optional("b", McdocType::numeric(NumericKind::Int))]),
        ]);
        let (diagnostics, _) = fixture.check("{b: 1}", Grammar::Snbt, &ty, CheckOptions::default());
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);

        let (diagnostics, _) = fixture.check("{c: 1}", Grammar::Snbt, &ty, CheckOptions::default());
        assert_eq!(messages(&diagnostics), vec!["unknown key c"]);
    }

    #[test]
    fn test_string_pool_and_boolean() {
        let fixture = Fixture::new();
        let pool = McdocType::string_pool(["red", "blue"]);
        let (diagnostics, _) = fixture.check(r#""green""#, Grammar::Json, &pool, CheckOptions::default());
        assert_eq!(messages(&diagnostics), vec!["expected one of red, blue"]);

        let (diagnostics, _) = fixture.check("1b", Grammar::Snbt, &McdocType::Boolean, CheckOptions::default());
        assert!(diagnostics.is_empty());
        let (diagnostics, _) = fixture.check("2b", Grammar::Snbt, &McdocType::Boolean, CheckOptions::default());
        assert_eq!(messages(&diagnostics), vec!["expected a boolean"]);
    }

    #[test]
    fn test_every_validated_node_is_annotated() {
        let fixture = Fixture::new();
        let ty = McdocType::list(McdocType::numeric(NumericKind::Int));
        let (_, annotations) = fixture.check("[1, 2]", Grammar::Snbt, &ty, CheckOptions::default());
        assert_eq!(annotations.len(), 3);
    }

    #[test]
    fn test_recursive_type_resolves_at_every_level() {
        let mut fixture = Fixture::new();
        fixture
            .schema
            .insert_type("test:nested", McdocType::list(McdocType::reference("test:nested")));
        let text = format!("{}{}", "[".repeat(100), "]".repeat(100));
        let (diagnostics, annotations) =
            fixture.check(&text, Grammar::Snbt, &McdocType::reference("test:nested"), CheckOptions::default());
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(annotations.len(), 100);
    }

    #[test]
    fn test_check_stops_at_nesting_limit() {
        let mut fixture = Fixture::new();
        fixture
            .schema
            .insert_type("test:nested", McdocType::list(McdocType::reference("test:nested")));
        let mut root = AstNode::new(NodeKind::NbtList, Range::empty(0));
        for _ in 0..(MAX_NESTING * 4) {
            root = AstNode::with_children(NodeKind::NbtList, Range::empty(0), vec![root]);
        }
        set_parents(&mut root);

        let mut ctx = CheckerContext::new(&fixture.meta, &fixture.schema, &fixture.tags, &fixture.project);
        check_type(&root, &McdocType::reference("test:nested"), &mut ctx, CheckOptions::default());
        assert!(ctx.err.is_empty());
        assert_eq!(ctx.annotations.len(), MAX_NESTING + 1);
    }

    #[test]
    fn test_cancelled_check_stops() {
        let fixture = Fixture::new();
        let doc = parse_document("{a: 1}", Grammar::Snbt, &CommandTree::default(), None);
        let mut root = doc.root;
        set_parents(&mut root);
        let mut ctx = CheckerContext::new(&fixture.meta, &fixture.schema, &fixture.tags, &fixture.project);
        ctx.cancel.cancel();
        check_type(&root, &McdocType::numeric(NumericKind::Int), &mut ctx, CheckOptions::default());
        assert!(ctx.err.is_empty());
        assert!(ctx.annotations.is_empty());
    }
}
