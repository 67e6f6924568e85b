//! Command language
//!
//! A function file holds one command per line. Each command is matched
//! against the signatures of a [`CommandTree`]; the first signature that
//! consumes the whole line wins, otherwise the one that got furthest.

mod argument;
mod tree;

pub use argument::{argument, block, coordinate, entity, item_predicate, item_stack, particle};
pub use tree::*;

use quill_ast::{AstNode, CommandChildNode, CommandNode, NodeKind, Range};

use crate::primitive::literal;
use crate::{ParserContext, Source, SyntaxError};

/// Parse a whole function file
pub fn parse_function(text: &str, ctx: &mut ParserContext, tree: &CommandTree) -> AstNode {
    let mut commands = Vec::new();
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let range = Range::new(line_start, line_start + content.len());
        line_start += line.len();

        let mut src = Source::bounded(text, range);
        src.skip_whitespace();
        if !src.can_read() || src.peek() == Some('#') {
            continue;
        }
        commands.push(parse_command(&mut src, ctx, tree));
    }
    AstNode::with_children(NodeKind::FunctionFile, Range::new(0, text.len()), commands)
}

/// Parse one command up to the end of `src`
pub fn parse_command(src: &mut Source<'_>, ctx: &mut ParserContext, tree: &CommandTree) -> AstNode {
    let start = src.cursor;
    let slash = src.try_read("/").then(|| src.range_from(start));

    let head_start = src.cursor;
    let head = src.remaining().split(char::is_whitespace).next().unwrap_or_default();

    let mut best: Option<Attempt<'_>> = None;
    for signature in tree.candidates(head) {
        let attempt = Attempt::run(src.clone(), ctx.clone(), signature);
        let better = match &best {
            None => true,
            Some(current) => attempt.is_complete() || attempt.rank() > current.rank(),
        };
        if better {
            best = Some(attempt);
        }
        if best.as_ref().is_some_and(Attempt::is_complete) {
            break;
        }
    }

    let Some(best) = best else {
        src.cursor = src.end();
        ctx.report(SyntaxError::UnknownCommand {
            span: Range::new(head_start, head_start + head.len()),
        });
        return AstNode::new(NodeKind::Command(CommandNode { slash }), src.range_from(start));
    };

    tracing::trace!(head, consumed = best.consumed, "matched command signature");
    let Attempt {
        src: mut matched,
        ctx: mut matched_ctx,
        children,
        missing,
        ..
    } = best;

    matched.skip_whitespace();
    if matched.can_read() {
        let rest = matched.cursor;
        matched.cursor = matched.end();
        matched_ctx.report(SyntaxError::TrailingData {
            span: matched.range_from(rest),
        });
    } else if let Some(expected) = missing {
        matched_ctx.report(SyntaxError::expected(expected, Range::empty(matched.cursor)));
    }

    *src = matched;
    *ctx = matched_ctx;
    AstNode::with_children(NodeKind::Command(CommandNode { slash }), src.range_from(start), children)
}

/// One signature tried against a sandboxed cursor and error sink
struct Attempt<'a> {
    src: Source<'a>,
    ctx: ParserContext,
    children: Vec<AstNode>,
    /// Slots matched
    consumed: usize,
    /// Description of the first slot the input ran out before
    missing: Option<String>,
}

impl<'a> Attempt<'a> {
    fn run(mut src: Source<'a>, mut ctx: ParserContext, signature: &CommandSignature) -> Self {
        let mut children = Vec::new();
        let mut path = Vec::new();
        let mut missing = None;

        for (index, slot) in signature.slots.iter().enumerate() {
            if index > 0 && !src.try_read(" ") {
                if !src.can_read() {
                    missing = Some(slot.describe());
                }
                break;
            }
            if !src.can_read() {
                missing = Some(slot.describe());
                break;
            }

            let slot_start = src.cursor;
            let node = match slot {
                Slot::Literal(value) => {
                    let Ok(node) = literal(&mut src, &mut ctx, &[value.as_str()]) else {
                        src.cursor = slot_start;
                        break;
                    };
                    path.push(value.clone());
                    node
                }
                Slot::Argument { name, kind } => {
                    path.push(name.clone());
                    argument::argument(&mut src, &mut ctx, kind)
                }
            };

            let payload = CommandChildNode { path: path.clone() };
            children.push(AstNode::with_children(
                NodeKind::CommandChild(payload),
                src.range_from(slot_start),
                vec![node],
            ));
            if let Slot::Argument { .. } = slot {
                path.pop();
            }
        }

        let consumed = children.len();
        Self {
            src,
            ctx,
            children,
            consumed,
            missing: if consumed < signature.slots.len() { missing } else { None },
        }
    }

    fn is_complete(&self) -> bool {
        self.missing.is_none() && !self.src.can_read() && self.consumed > 0
    }

    /// Further is better, then fewer errors
    fn rank(&self) -> (usize, std::cmp::Reverse<usize>) {
        (self.consumed, std::cmp::Reverse(self.ctx.err.error_count()))
    }
}
