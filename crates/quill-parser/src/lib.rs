//! Quill Parser - Parser primitives and document grammars
//!
//! Parsers take a [`Source`] and a [`ParserContext`] and either produce a node
//! or fail with [`Failure`]. Malformed input never fails a parse: it is
//! reported to the context's error sink and a best-effort node is returned.

mod context;
mod error;
mod source;

pub mod collection;
pub mod command;
pub mod float;
pub mod json;
pub mod primitive;
pub mod snbt;

pub use context::*;
pub use error::*;
pub use source::*;

use quill_ast::{AstNode, Diagnostic};
use serde::{Deserialize, Serialize};

use command::CommandTree;

/// Top-level grammar of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    Snbt,
    Json,
    /// Function files, one command per line
    Command,
}

impl Grammar {
    /// Guess the grammar from a file extension
    pub fn from_path(path: &str) -> Option<Grammar> {
        let extension = path.rsplit_once('.')?.1;
        match extension {
            "snbt" => Some(Grammar::Snbt),
            "json" | "mcmeta" => Some(Grammar::Json),
            "mcfunction" => Some(Grammar::Command),
            _ => None,
        }
    }
}

/// Result of parsing a whole document
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub root: AstNode,
    pub diagnostics: Vec<Diagnostic>,
    /// Completion offset after whitespace correction
    pub completion_offset: Option<usize>,
}

/// Parse `text` as a whole document.
///
/// The returned tree is detached: node ids and parent links are assigned by
/// the caller with [`quill_ast::set_parents`].
pub fn parse_document(
    text: &str,
    grammar: Grammar,
    commands: &CommandTree,
    completion_offset: Option<usize>,
) -> ParsedDocument {
    let mut ctx = ParserContext {
        completion_offset,
        ..ParserContext::default()
    };
    let mut src = Source::new(text);
    let root = match grammar {
        Grammar::Snbt => snbt::parse_snbt(&mut src, &mut ctx),
        Grammar::Json => json::parse_json(&mut src, &mut ctx),
        Grammar::Command => command::parse_function(text, &mut ctx, commands),
    };
    tracing::debug!(?grammar, diagnostics = ctx.err.len(), "parsed document");

    ParsedDocument {
        root,
        diagnostics: ctx.err.into_vec(),
        completion_offset: ctx.completion_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_from_path() {
        assert_eq!(Grammar::from_path("data/a/loot_table/b.json"), Some(Grammar::Json));
        assert_eq!(Grammar::from_path("pack.mcmeta"), Some(Grammar::Json));
        assert_eq!(Grammar::from_path("load.mcfunction"), Some(Grammar::Command));
        assert_eq!(Grammar::from_path("README"), None);
    }

    #[test]
    fn test_parse_document_collects_diagnostics() {
        let doc = parse_document("{a: }", Grammar::Snbt, &CommandTree::default(), None);
        assert_eq!(doc.root.kind.tag(), "nbt:compound");
        assert_eq!(doc.diagnostics.len(), 1);
    }

    #[test]
    fn test_parse_document_corrects_completion_offset() {
        let doc = parse_document("{  }", Grammar::Json, &CommandTree::default(), Some(1));
        assert_eq!(doc.completion_offset, Some(3));
    }
}
