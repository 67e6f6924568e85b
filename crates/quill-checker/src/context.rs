//! Per-invocation checker and completer state

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use quill_ast::{ErrorSink, NodeId, NodeIdAllocator, NodeIndex, Range};
use quill_schema::{McdocType, RegistryService, SchemaService};

use crate::{CheckError, MetaRegistry, ReleaseVersion};

/// Type each validated node was checked against
pub type Annotations = HashMap<NodeId, McdocType>;

/// Cooperative cancellation shared between a host and a running pass
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Project-wide settings consulted by checkers
#[derive(Debug, Clone, Default)]
pub struct Project {
    /// Release the project targets; `None` means latest
    pub release: Option<ReleaseVersion>,
    /// Resource category (e.g. `loot_table`, `worldgen/biome`) to document type
    pub categories: BTreeMap<String, McdocType>,
}

/// A resource id seen in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolReference {
    pub id: String,
    pub category: Option<String>,
    pub range: Range,
}

/// State threaded through binders and checkers
pub struct CheckerContext<'a> {
    pub meta: &'a MetaRegistry,
    pub schema: &'a dyn SchemaService,
    pub registry: &'a dyn RegistryService,
    pub project: &'a Project,
    /// Project-relative path of the document, `/` separated
    pub doc_path: Option<&'a str>,
    pub err: ErrorSink,
    pub annotations: Annotations,
    pub index: NodeIndex,
    /// Continues numbering for spliced sub-documents
    pub ids: NodeIdAllocator,
    pub cancel: CancellationFlag,
    pub references: Vec<SymbolReference>,
}

impl<'a> CheckerContext<'a> {
    pub fn new(
        meta: &'a MetaRegistry,
        schema: &'a dyn SchemaService,
        registry: &'a dyn RegistryService,
        project: &'a Project,
    ) -> Self {
        Self {
            meta,
            schema,
            registry,
            project,
            doc_path: None,
            err: ErrorSink::new(),
            annotations: Annotations::new(),
            index: NodeIndex::default(),
            ids: NodeIdAllocator::new(),
            cancel: CancellationFlag::new(),
            references: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: &'a str) -> Self {
        self.doc_path = Some(path);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn report(&mut self, error: CheckError, range: Range) {
        self.err.report_with(error.to_string(), range, error.severity());
    }

    pub fn annotate(&mut self, id: NodeId, ty: &McdocType) {
        if !id.is_detached() {
            self.annotations.insert(id, ty.clone());
        }
    }

    /// Tag of the parent of `id`, from the node index
    pub fn parent_tag(&self, id: NodeId) -> Option<&'static str> {
        self.index.parent(id).and_then(|parent| self.index.tag(parent))
    }
}

/// State handed to completers
pub struct CompleterContext<'a> {
    /// Cursor offset after whitespace correction
    pub offset: usize,
    pub meta: &'a MetaRegistry,
    pub schema: &'a dyn SchemaService,
    pub registry: &'a dyn RegistryService,
    pub annotations: &'a Annotations,
    /// Character that triggered the request, if any
    pub trigger: Option<char>,
}

impl CompleterContext<'_> {
    pub fn annotation(&self, id: NodeId) -> Option<&McdocType> {
        self.annotations.get(&id)
    }
}
