//! Argument parsers
//!
//! Every argument parser is infallible: it yields a node of its own kind and
//! reports what is malformed. Signature selection is driven by literals.

use quill_ast::{
    AstNode, BlockNode, ComponentTestKind, ComponentTestNode, EntityNode, JsonArgumentNode, NbtArgumentNode,
    NbtProperties, NbtResourceNode, NodeKind, Range, SelectorNode, SelectorValueNode,
};

use crate::collection::{collection, Delimiters};
use crate::context::skip_whitespace;
use crate::float::{float, FloatOptions};
use crate::primitive::{
    integer, is_unquotable_char, resource_location, string, IntegerOptions, ResourceLocationOptions, StringOptions,
};
use crate::{json, snbt, Failure, ParseResult, ParserContext, Source, SyntaxError};

use super::ArgumentKind;

const SELECTOR_VARIABLES: [char; 6] = ['a', 'e', 'n', 'p', 'r', 's'];

pub fn argument(src: &mut Source<'_>, ctx: &mut ParserContext, kind: &ArgumentKind) -> AstNode {
    match kind {
        ArgumentKind::Entity => entity(src, ctx),
        ArgumentKind::ItemStack => item_stack(src, ctx),
        ArgumentKind::ItemPredicate => item_predicate(src, ctx),
        ArgumentKind::Block { is_predicate } => block(src, ctx, *is_predicate),
        ArgumentKind::Particle => particle(src, ctx),
        ArgumentKind::Json { type_ref } => {
            let start = src.cursor;
            let value = json::value(src, ctx);
            let payload = JsonArgumentNode {
                type_ref: type_ref.clone(),
            };
            AstNode::with_children(NodeKind::JsonArgument(payload), src.range_from(start), vec![value])
        }
        ArgumentKind::Nbt {
            dispatcher,
            dispatched_by,
            is_predicate,
        } => {
            let start = src.cursor;
            let compound = required_compound(src, ctx);
            let payload = NbtArgumentNode {
                properties: Some(NbtProperties {
                    dispatcher: dispatcher.clone(),
                    dispatched_by: dispatched_by.clone(),
                    is_predicate: *is_predicate,
                }),
            };
            AstNode::with_children(NodeKind::NbtArgument(payload), src.range_from(start), vec![compound])
        }
        ArgumentKind::NbtResource { category } => {
            let start = src.cursor;
            let value = match snbt::compound(src, ctx) {
                Ok(compound) => compound,
                Err(Failure) => resource_location(src, ctx, &id_options(category, false))
                    .unwrap_or_else(|_| missing(src, ctx, "a resource location")),
            };
            let payload = NbtResourceNode {
                category: category.clone(),
            };
            AstNode::with_children(NodeKind::NbtResource(payload), src.range_from(start), vec![value])
        }
        ArgumentKind::ResourceLocation { category, allow_tag } => {
            resource_location(src, ctx, &id_options(category, *allow_tag))
                .unwrap_or_else(|_| missing(src, ctx, "a resource location"))
        }
        ArgumentKind::Integer { min, max } => {
            let options = IntegerOptions {
                min: *min,
                max: *max,
                fails_on_empty: false,
            };
            integer(src, ctx, options).unwrap_or_else(|_| missing(src, ctx, "an integer"))
        }
        ArgumentKind::Coordinate => coordinate(src, ctx),
        ArgumentKind::Word => string(src, ctx, StringOptions {
            quotes: &[],
            ..StringOptions::BRIGADIER
        })
        .unwrap_or_else(|_| missing(src, ctx, "a word")),
    }
}

fn id_options(category: &str, allow_tag: bool) -> ResourceLocationOptions {
    ResourceLocationOptions {
        category: Some(category.to_string()),
        allow_tag,
        fails_on_empty: false,
    }
}

fn missing(src: &Source<'_>, ctx: &mut ParserContext, expected: &str) -> AstNode {
    let range = Range::empty(src.cursor);
    ctx.report(SyntaxError::expected(expected, range));
    AstNode::new(NodeKind::Error, range)
}

fn required_compound(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    snbt::compound(src, ctx).unwrap_or_else(|_| missing(src, ctx, "a compound"))
}

// === Entity ===

/// `@e[type=pig,nbt={...}]` or a player name
pub fn entity(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    let start = src.cursor;
    if src.peek() != Some('@') {
        let name = src.read_while(|c| !c.is_whitespace());
        if name.is_empty() {
            return missing(src, ctx, "an entity");
        }
        let payload = EntityNode {
            player_name: Some(name.to_string()),
        };
        return AstNode::new(NodeKind::Entity(payload), src.range_from(start));
    }

    src.skip();
    let variable = match src.peek() {
        Some(c) if SELECTOR_VARIABLES.contains(&c) => {
            src.skip();
            c
        }
        _ => {
            ctx.report(SyntaxError::expected("a selector variable", src.range_from(start)));
            'e'
        }
    };

    let mut children = Vec::new();
    if let Ok(arguments) = collection(
        src,
        ctx,
        NodeKind::SelectorArguments,
        Delimiters::BRACKET_ASSIGN,
        |src, ctx| string(src, ctx, StringOptions::BRIGADIER),
        selector_value,
    ) {
        children.push(arguments);
    }
    let selector = AstNode::with_children(
        NodeKind::Selector(SelectorNode { variable }),
        src.range_from(start),
        children,
    );
    AstNode::with_children(
        NodeKind::Entity(EntityNode::default()),
        src.range_from(start),
        vec![selector],
    )
}

fn selector_value(src: &mut Source<'_>, ctx: &mut ParserContext, key: &AstNode) -> ParseResult {
    let start = src.cursor;
    let inverted = src.try_read("!");
    if inverted {
        skip_whitespace(src, ctx);
    }
    let value = match key.string_value() {
        Some("type") => resource_location(src, ctx, &id_options("entity_type", true))?,
        Some("nbt") => snbt::compound(src, ctx)?,
        Some("tag" | "team" | "name") => string(src, ctx, StringOptions::BRIGADIER)?,
        _ => snbt::value_or_fail(src, ctx)?,
    };
    Ok(AstNode::with_children(
        NodeKind::SelectorValue(SelectorValueNode { inverted }),
        src.range_from(start),
        vec![value],
    ))
}

// === Items ===

/// `id[component=value,...]{nbt}`
pub fn item_stack(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    let start = src.cursor;
    let mut children = vec![resource_location(src, ctx, &id_options("item", false))
        .unwrap_or_else(|_| missing(src, ctx, "an item"))];

    if let Ok(components) = collection(
        src,
        ctx,
        NodeKind::ItemComponents,
        Delimiters::BRACKET_ASSIGN,
        component_id,
        |src, ctx, _| snbt::value_or_fail(src, ctx),
    ) {
        children.push(components);
    }
    if let Ok(nbt) = snbt::compound(src, ctx) {
        children.push(nbt);
    }
    AstNode::with_children(NodeKind::ItemStack, src.range_from(start), children)
}

fn component_id(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    let options = ResourceLocationOptions {
        fails_on_empty: true,
        ..id_options("data_component_type", false)
    };
    resource_location(src, ctx, &options)
}

/// `id[count=1|minecraft:damage~{...},!custom_data]{nbt}`
pub fn item_predicate(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    let start = src.cursor;
    let mut children = vec![resource_location(src, ctx, &id_options("item", true))
        .unwrap_or_else(|_| missing(src, ctx, "an item"))];

    if let Ok(tests) = component_tests(src, ctx) {
        children.push(tests);
    }
    if let Ok(nbt) = snbt::compound(src, ctx) {
        children.push(nbt);
    }
    AstNode::with_children(NodeKind::ItemPredicate, src.range_from(start), children)
}

/// `[a|b,c]`: alternatives separated by `|`, each a `,` separated conjunction
fn component_tests(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    let start = src.cursor;
    if !src.try_read("[") {
        return Err(Failure);
    }

    let mut groups = Vec::new();
    let mut failed = false;
    'groups: loop {
        let group_start = src.cursor;
        let mut tests = Vec::new();
        loop {
            skip_whitespace(src, ctx);
            if !src.can_read() || src.peek_is("]") {
                break;
            }
            match component_test(src, ctx) {
                Ok(test) => tests.push(test),
                Err(Failure) => {
                    failed = true;
                    groups.push(AstNode::with_children(
                        NodeKind::ComponentTestGroup,
                        src.range_from(group_start),
                        tests,
                    ));
                    break 'groups;
                }
            }
            skip_whitespace(src, ctx);
            if !src.try_read(",") {
                break;
            }
        }
        groups.push(AstNode::with_children(
            NodeKind::ComponentTestGroup,
            src.range_from(group_start),
            tests,
        ));
        if !src.try_read("|") {
            break;
        }
    }

    if failed {
        ctx.report(SyntaxError::expected("a component test", src.range_from(start)));
    } else if !src.try_read("]") {
        ctx.report(SyntaxError::expected("']'", src.range_from(start)));
    }
    Ok(AstNode::with_children(NodeKind::ComponentTests, src.range_from(start), groups))
}

fn component_test(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    let start = src.cursor;
    let negated = src.try_read("!");
    let id = component_id(src, ctx)?;
    let mut children = vec![id];
    let test = if src.try_read("=") {
        children.push(snbt::value(src, ctx));
        ComponentTestKind::Exact
    } else if src.try_read("~") {
        children.push(snbt::value(src, ctx));
        ComponentTestKind::Subpredicate
    } else {
        ComponentTestKind::Exists
    };
    Ok(AstNode::with_children(
        NodeKind::ComponentTest(ComponentTestNode { test, negated }),
        src.range_from(start),
        children,
    ))
}

// === Blocks and particles ===

/// `id[state=value,...]{nbt}`; tags are only allowed in predicates
pub fn block(src: &mut Source<'_>, ctx: &mut ParserContext, is_predicate: bool) -> AstNode {
    let start = src.cursor;
    let mut children = vec![resource_location(src, ctx, &id_options("block", is_predicate))
        .unwrap_or_else(|_| missing(src, ctx, "a block"))];

    if let Ok(states) = collection(
        src,
        ctx,
        NodeKind::BlockStates,
        Delimiters::BRACKET_ASSIGN,
        |src, ctx| string(src, ctx, StringOptions::BRIGADIER),
        |src, ctx, _| string(src, ctx, StringOptions::BRIGADIER),
    ) {
        children.push(states);
    }
    if let Ok(nbt) = snbt::compound(src, ctx) {
        children.push(nbt);
    }
    AstNode::with_children(
        NodeKind::Block(BlockNode { is_predicate }),
        src.range_from(start),
        children,
    )
}

/// `id{options}`
pub fn particle(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    let start = src.cursor;
    let mut children = vec![resource_location(src, ctx, &id_options("particle_type", false))
        .unwrap_or_else(|_| missing(src, ctx, "a particle"))];
    if let Ok(options) = snbt::compound(src, ctx) {
        children.push(options);
    }
    AstNode::with_children(NodeKind::Particle, src.range_from(start), children)
}

// === Coordinates ===

/// `1.5`, `~`, `~-2` or `^1`
pub fn coordinate(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    let start = src.cursor;
    let relative = src.try_read("~") || src.try_read("^");
    let options = FloatOptions {
        fails_on_empty: relative,
        ..FloatOptions::default()
    };
    let _ = float(src, ctx, &options);
    if src.peek().is_some_and(is_unquotable_char) {
        let rest = src.cursor;
        src.read_while(is_unquotable_char);
        ctx.report(SyntaxError::IllegalNumber {
            span: src.range_from(rest),
        });
    }
    let range = src.range_from(start);
    AstNode::new(NodeKind::Literal(src.slice(range).to_string()), range)
}
