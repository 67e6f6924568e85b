//! Parse, check and complete whole documents

use quill_ast::{AstNode, Diagnostic};
use quill_parser::command::CommandTree;
use quill_parser::{parse_document, Grammar};
use quill_schema::{SchemaTable, TagTable};

use crate::completion::{complete, CompletionItem};
use crate::{
    build_default_registry, check_document, Annotations, CancellationFlag, CheckerContext, CompleterContext,
    MetaRegistry, Project, SymbolReference,
};

/// Everything needed to process documents of one project.
///
/// Read-only once built; share it between threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Engine {
    pub meta: MetaRegistry,
    pub schema: SchemaTable,
    pub tags: TagTable,
    pub project: Project,
    pub commands: CommandTree,
}

/// Result of checking one document
#[derive(Debug, Clone)]
pub struct CheckedDocument {
    pub root: AstNode,
    /// Syntax and semantic diagnostics, in document order
    pub diagnostics: Vec<Diagnostic>,
    pub annotations: Annotations,
    pub references: Vec<SymbolReference>,
}

impl Engine {
    pub fn new(schema: SchemaTable, tags: TagTable, project: Project) -> Self {
        Self {
            meta: build_default_registry(),
            schema,
            tags,
            project,
            commands: CommandTree::builtin(),
        }
    }

    pub fn with_commands(mut self, commands: CommandTree) -> Self {
        self.commands = commands;
        self
    }

    fn context<'a>(&'a self, path: Option<&'a str>) -> CheckerContext<'a> {
        let ctx = CheckerContext::new(&self.meta, &self.schema, &self.tags, &self.project);
        match path {
            Some(path) => ctx.with_path(path),
            None => ctx,
        }
    }

    /// Parse and check `text`; `path` is project-relative and selects the document type
    pub fn check_text(
        &self,
        text: &str,
        grammar: Grammar,
        path: Option<&str>,
        cancel: Option<CancellationFlag>,
    ) -> CheckedDocument {
        let doc = parse_document(text, grammar, &self.commands, None);
        let mut root = doc.root;

        let mut ctx = self.context(path);
        if let Some(cancel) = cancel {
            ctx = ctx.with_cancellation(cancel);
        }
        check_document(&mut root, &mut ctx);

        let mut diagnostics = doc.diagnostics;
        diagnostics.extend(ctx.err.into_vec());
        diagnostics.sort_by_key(|d| (d.range.start, d.range.end));
        CheckedDocument {
            root,
            diagnostics,
            annotations: ctx.annotations,
            references: ctx.references,
        }
    }

    /// Completions at `offset` in `text`
    pub fn complete_text(
        &self,
        text: &str,
        grammar: Grammar,
        path: Option<&str>,
        offset: usize,
        trigger: Option<char>,
    ) -> Vec<CompletionItem> {
        let span = tracing::debug_span!("complete_document", offset);
        let _enter = span.enter();

        let doc = parse_document(text, grammar, &self.commands, Some(offset));
        let offset = doc.completion_offset.unwrap_or(offset);
        let mut root = doc.root;

        let mut ctx = self.context(path);
        check_document(&mut root, &mut ctx);

        let completer = CompleterContext {
            offset,
            meta: &self.meta,
            schema: &self.schema,
            registry: &self.tags,
            annotations: &ctx.annotations,
            trigger,
        };
        complete(&root, offset, &completer)
    }
}
