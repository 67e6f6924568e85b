//! Checkers for command arguments
//!
//! Every argument slot of a command is matched on its node kind and the data
//! it carries is validated against the schema registry it belongs to.

use std::collections::HashMap;

use quill_ast::{
    resource, set_parents_under, AstNode, ComponentTestKind, Diagnostic, NodeKind, NumericKind, Range,
    ResourceLocationNode, StringNode,
};
use quill_parser::{snbt, ParserContext, Source};
use quill_schema::{McdocType, NumericRange, StructField};

use crate::mcdoc::{check_dispatch, check_type, CheckOptions};
use crate::{bind, dispatch, entity_types, CheckError, CheckerContext, ReleaseVersion};

const CUSTOM_DATA: &str = "minecraft:custom_data";
const COUNT: &str = "minecraft:count";

/// Particles that take an options compound
const REQUIRES_OPTIONS: [&str; 12] = [
    "minecraft:block",
    "minecraft:block_marker",
    "minecraft:falling_dust",
    "minecraft:dust_pillar",
    "minecraft:dust",
    "minecraft:dust_color_transition",
    "minecraft:entity_effect",
    "minecraft:item",
    "minecraft:sculk_charge",
    "minecraft:shriek",
    "minecraft:vibration",
    "minecraft:trail",
];

/// First release whose particles take options as SNBT
const PARTICLE_OPTIONS_SINCE: ReleaseVersion = ReleaseVersion::new(1, 20, 5);

/// Checker of `mcfunction:command` nodes
pub fn command(node: &mut AstNode, ctx: &mut CheckerContext<'_>) {
    if let NodeKind::Command(payload) = &node.kind {
        if let Some(slash) = payload.slash {
            if ctx.parent_tag(node.id) == Some("mcfunction:file") {
                ctx.report(CheckError::LeadingSlash, slash);
            }
        }
    }

    let keys = dispatch_keys(node, ctx);
    for child in &mut node.children {
        if ctx.cancel.is_cancelled() {
            return;
        }
        let Some(argument) = child.children.first_mut() else {
            continue;
        };
        match &argument.kind {
            NodeKind::Block(block) => {
                let options = CheckOptions {
                    is_predicate: block.is_predicate,
                };
                check_block(argument, options, ctx);
            }
            NodeKind::Entity(_) => check_entity(argument, ctx),
            NodeKind::ItemStack => check_item_stack(argument, ctx),
            NodeKind::ItemPredicate => check_item_predicate(argument, ctx),
            NodeKind::Particle => check_particle(argument, ctx),
            NodeKind::JsonArgument(json) => {
                let ty = McdocType::reference(json.type_ref.clone());
                if let Some(value) = argument.children.first() {
                    check_type(value, &ty, ctx, CheckOptions::default());
                }
            }
            NodeKind::NbtArgument(nbt) => {
                let Some(properties) = &nbt.properties else {
                    continue;
                };
                let keys = properties
                    .dispatched_by
                    .as_ref()
                    .and_then(|name| keys.get(name.as_str()))
                    .cloned()
                    .unwrap_or_default();
                let options = CheckOptions {
                    is_predicate: properties.is_predicate,
                };
                if let Some(compound) = argument.children.first() {
                    check_dispatch(compound, &properties.dispatcher, &keys, ctx, options);
                }
            }
            NodeKind::NbtResource(payload) => {
                let ty = McdocType::dispatch_static("minecraft:resource", resource::lengthen(&payload.category));
                if let Some(compound) = argument
                    .children
                    .first()
                    .filter(|value| value.kind == NodeKind::NbtCompound)
                {
                    check_type(compound, &ty, ctx, CheckOptions::default());
                }
            }
            _ => {}
        }
    }
}

/// Dispatch keys supplied by each named argument of the command
fn dispatch_keys(node: &AstNode, ctx: &CheckerContext<'_>) -> HashMap<String, Vec<String>> {
    let mut keys = HashMap::new();
    for child in &node.children {
        let NodeKind::CommandChild(payload) = &child.kind else {
            continue;
        };
        let (Some(name), Some(argument)) = (payload.name(), child.children.first()) else {
            continue;
        };
        let values = match &argument.kind {
            NodeKind::ResourceLocation(id) => id_keys(id, ctx),
            NodeKind::Entity(_) => entity_types(argument, ctx.registry).unwrap_or_default(),
            _ => continue,
        };
        keys.insert(name.to_string(), values);
    }
    keys
}

/// The id itself, or the members of the tag it names
fn id_keys(id: &ResourceLocationNode, ctx: &CheckerContext<'_>) -> Vec<String> {
    let full = id.to_full();
    match (full.strip_prefix(resource::TAG_PREFIX), &id.category) {
        (Some(tag), Some(category)) => ctx.registry.tag_values(&format!("tag/{}", category), tag),
        (Some(_), None) => Vec::new(),
        (None, _) => vec![full],
    }
}

fn first_id<'n>(node: &'n AstNode) -> Option<&'n ResourceLocationNode> {
    node.children.first().and_then(|child| child.resource_location())
}

fn check_block(node: &AstNode, options: CheckOptions, ctx: &mut CheckerContext<'_>) {
    let Some(id) = first_id(node) else {
        return;
    };
    let keys = id_keys(id, ctx);
    if let Some(nbt) = node.find_child(|child| child.kind == NodeKind::NbtCompound) {
        check_dispatch(nbt, "minecraft:block", &keys, ctx, options);
    }
}

fn check_entity(node: &AstNode, ctx: &mut CheckerContext<'_>) {
    let Some(arguments) = node
        .children
        .first()
        .and_then(|selector| selector.find_child(|child| child.kind == NodeKind::SelectorArguments))
    else {
        return;
    };
    let types = entity_types(node, ctx.registry).unwrap_or_default();
    let options = CheckOptions { is_predicate: true };
    for pair in arguments.pairs() {
        if pair.pair_key().and_then(|key| key.string_value()) != Some("nbt") {
            continue;
        }
        let compound = pair
            .pair_value()
            .and_then(|value| value.children.first())
            .filter(|value| value.kind == NodeKind::NbtCompound);
        if let Some(compound) = compound {
            check_dispatch(compound, "minecraft:entity", &types, ctx, options);
        }
    }
}

// === Items ===

fn check_item_stack(node: &mut AstNode, ctx: &mut CheckerContext<'_>) {
    let Some(item) = first_id(node).map(ResourceLocationNode::to_full) else {
        return;
    };

    if let Some(components) = node.find_child_mut(|child| child.kind == NodeKind::ItemComponents) {
        report_duplicate_components(components, ctx);
        for pair in components.children.iter_mut() {
            let Some(key) = pair.pair_key().and_then(|key| key.resource_location()).map(ResourceLocationNode::to_full)
            else {
                continue;
            };
            let Some(value) = pair.pair_value_mut() else {
                continue;
            };
            if key == CUSTOM_DATA && value.kind.is_string() {
                embed_custom_data(value, &item, ctx);
            } else if key == CUSTOM_DATA {
                check_dispatch(value, "mcdoc:custom_item_data", &[item.clone()], ctx, CheckOptions::default());
            } else {
                check_dispatch(value, "minecraft:data_component", &[key], ctx, CheckOptions::default());
            }
        }
    }

    if let Some(nbt) = node.find_child(|child| child.kind == NodeKind::NbtCompound) {
        check_dispatch(nbt, "minecraft:item", &[item], ctx, CheckOptions::default());
    }
}

/// Warn on every key of a component given more than once
fn report_duplicate_components(components: &AstNode, ctx: &mut CheckerContext<'_>) {
    let mut groups: Vec<(String, Vec<Range>)> = Vec::new();
    for pair in components.pairs() {
        let Some(key) = pair.pair_key() else {
            continue;
        };
        let Some(id) = key.resource_location().map(ResourceLocationNode::to_full) else {
            continue;
        };
        match groups.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, ranges)) => ranges.push(key.range),
            None => groups.push((id, vec![key.range])),
        }
    }
    for (id, ranges) in groups.into_iter().filter(|(_, ranges)| ranges.len() > 1) {
        for range in ranges {
            ctx.report(CheckError::DuplicateComponent { id: id.clone() }, range);
        }
    }
}

/// Parse a `custom_data` string as SNBT and check it as part of the document.
///
/// The parsed compound becomes the only child of the string node.
fn embed_custom_data(value: &mut AstNode, item: &str, ctx: &mut CheckerContext<'_>) {
    let Some(string) = value.kind.string().cloned() else {
        return;
    };
    let span = tracing::debug_span!("embedded_snbt", item);
    let _enter = span.enter();

    let mut parse_ctx = ParserContext::new();
    let mut src = Source::new(&string.value);
    let Ok(mut sub) = snbt::compound(&mut src, &mut parse_ctx) else {
        ctx.report(CheckError::expected("a compound"), value.range);
        return;
    };
    src.skip_whitespace();
    if src.can_read() {
        let rest = Range::new(src.cursor, src.end());
        parse_ctx.report(quill_parser::SyntaxError::TrailingData { span: rest });
    }

    remap(&mut sub, &string);
    ctx.err.extend(parse_ctx.err.into_vec().into_iter().map(|diagnostic| Diagnostic {
        range: diagnostic.range.map(|offset| string.to_source_offset(offset)),
        ..diagnostic
    }));

    set_parents_under(&mut sub, Some(value.id), &mut ctx.ids);
    ctx.index.extend(&sub);
    bind(&sub, ctx);
    dispatch(&mut sub, ctx);
    let ty = McdocType::dispatch_static("mcdoc:custom_item_data", item);
    check_type(&sub, &ty, ctx, CheckOptions::default());

    value.children = vec![sub];
}

/// Move every range of a tree parsed from `string.value` into source offsets
fn remap(node: &mut AstNode, string: &StringNode) {
    node.range = node.range.map(|offset| string.to_source_offset(offset));
    if let NodeKind::String(inner) | NodeKind::NbtString(inner) | NodeKind::JsonString(inner) = &mut node.kind {
        for offset in &mut inner.value_map {
            *offset = string.to_source_offset(*offset);
        }
    }
    if let NodeKind::Pair(pair) = &mut node.kind {
        pair.sep = pair.sep.map(|sep| sep.map(|offset| string.to_source_offset(offset)));
    }
    for child in &mut node.children {
        remap(child, string);
    }
}

fn check_item_predicate(node: &AstNode, ctx: &mut CheckerContext<'_>) {
    let Some(id) = first_id(node) else {
        return;
    };
    let keys = id_keys(id, ctx);

    if let Some(tests) = node.find_child(|child| child.kind == NodeKind::ComponentTests) {
        for test in tests.children.iter().flat_map(|group| group.children.iter()) {
            check_component_test(test, ctx);
        }
    }
    if let Some(nbt) = node.find_child(|child| child.kind == NodeKind::NbtCompound) {
        check_dispatch(nbt, "minecraft:item", &keys, ctx, CheckOptions { is_predicate: true });
    }
}

fn check_component_test(test: &AstNode, ctx: &mut CheckerContext<'_>) {
    let NodeKind::ComponentTest(payload) = &test.kind else {
        return;
    };
    let (Some(id), Some(value)) = (first_id(test).map(ResourceLocationNode::to_full), test.children.get(1)) else {
        return;
    };
    let ty = if id == COUNT {
        count_predicate()
    } else {
        match payload.test {
            ComponentTestKind::Exact => McdocType::dispatch_static("minecraft:data_component", id),
            ComponentTestKind::Subpredicate => McdocType::dispatch_static("minecraft:item_sub_predicate", id),
            ComponentTestKind::Exists => return,
        }
    };
    check_type(value, &ty, ctx, CheckOptions { is_predicate: true });
}

/// `count` accepts an exact amount or a `{min, max}` range
fn count_predicate() -> McdocType {
    let amount = || McdocType::numeric_in(NumericKind::Int, NumericRange::at_least(0.0));
    McdocType::union(vec![
        amount(),
        McdocType::structure(vec![
            StructField::optional("min", amount()),
            StructField::optional("max", amount()),
        ]),
    ])
}

fn check_particle(node: &AstNode, ctx: &mut CheckerContext<'_>) {
    if ctx.project.release.is_some_and(|release| release < PARTICLE_OPTIONS_SINCE) {
        return;
    }
    let Some(id_node) = node.children.first() else {
        return;
    };
    let Some(id) = id_node.resource_location().map(ResourceLocationNode::to_full) else {
        return;
    };
    let options = node.find_child(|child| child.kind == NodeKind::NbtCompound);
    let requires_options = REQUIRES_OPTIONS.contains(&id.as_str());

    match (options, requires_options) {
        (None, true) => {
            let end = id_node.range.end;
            ctx.report(CheckError::expected("a compound"), Range::new(end, end + 1));
        }
        (Some(options), false) => ctx.report(CheckError::expected("nothing"), options.range),
        (Some(options), true) => {
            check_dispatch(options, "minecraft:particle", &[id], ctx, CheckOptions::default());
        }
        (None, false) => {}
    }
}
