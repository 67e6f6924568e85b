//! Tag-keyed tables of checkers, binders and completers

use std::collections::HashMap;
use std::fmt;

use quill_ast::AstNode;

use crate::completion::{json as json_completer, nbt as nbt_completer, resource, CompletionItem};
use crate::{binder, command, document, CheckerContext, CompleterContext};

/// Validates a node; may splice embedded sub-documents into it
pub type CheckerFn = fn(&mut AstNode, &mut CheckerContext<'_>);

/// Records symbols before checking
pub type BinderFn = fn(&AstNode, &mut CheckerContext<'_>);

/// Suggests completions for the selected node given its parent chain (innermost first)
pub type CompleterFn = fn(&AstNode, &[&AstNode], &CompleterContext<'_>) -> Vec<CompletionItem>;

/// Routes nodes to their handlers by [`NodeKind::tag`](quill_ast::NodeKind::tag).
///
/// Built once before a pass and read-only while it runs. Registering a tag
/// twice replaces the earlier handler.
#[derive(Clone, Default)]
pub struct MetaRegistry {
    checkers: HashMap<&'static str, CheckerFn>,
    binders: HashMap<&'static str, BinderFn>,
    completers: HashMap<&'static str, CompleterFn>,
}

impl MetaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_checker(&mut self, tag: &'static str, checker: CheckerFn) {
        self.checkers.insert(tag, checker);
    }

    pub fn register_binder(&mut self, tag: &'static str, binder: BinderFn) {
        self.binders.insert(tag, binder);
    }

    pub fn register_completer(&mut self, tag: &'static str, completer: CompleterFn) {
        self.completers.insert(tag, completer);
    }

    pub fn checker(&self, tag: &str) -> Option<CheckerFn> {
        self.checkers.get(tag).copied()
    }

    pub fn binder(&self, tag: &str) -> Option<BinderFn> {
        self.binders.get(tag).copied()
    }

    pub fn completer(&self, tag: &str) -> Option<CompleterFn> {
        self.completers.get(tag).copied()
    }
}

impl fmt::Debug for MetaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags = |map: Vec<&&'static str>| {
            let mut tags: Vec<_> = map.into_iter().copied().collect();
            tags.sort_unstable();
            tags
        };
        f.debug_struct("MetaRegistry")
            .field("checkers", &tags(self.checkers.keys().collect()))
            .field("binders", &tags(self.binders.keys().collect()))
            .field("completers", &tags(self.completers.keys().collect()))
            .finish()
    }
}

/// Registry with every built-in handler
pub fn build_default_registry() -> MetaRegistry {
    let mut meta = MetaRegistry::new();

    meta.register_binder("resource_location", binder::resource_location);

    meta.register_checker("mcfunction:command", command::command);
    for tag in [
        "json:object",
        "json:array",
        "json:string",
        "json:number",
        "json:boolean",
        "json:null",
        "nbt:compound",
    ] {
        meta.register_checker(tag, document::file);
    }

    meta.register_completer("nbt:compound", nbt_completer::compound);
    for tag in ["nbt:list", "nbt:byte_array", "nbt:int_array", "nbt:long_array"] {
        meta.register_completer(tag, nbt_completer::collection);
    }
    for tag in [
        "nbt:string",
        "nbt:byte",
        "nbt:short",
        "nbt:int",
        "nbt:long",
        "nbt:float",
        "nbt:double",
    ] {
        meta.register_completer(tag, nbt_completer::primitive);
    }
    meta.register_completer("json:object", json_completer::object);
    meta.register_completer("json:array", json_completer::array);
    for tag in ["json:string", "json:number", "json:boolean", "json:null"] {
        meta.register_completer(tag, json_completer::primitive);
    }
    meta.register_completer("resource_location", resource::resource_location);

    meta
}
