//! Asynchronous schema prefetching
//!
//! Checking is synchronous. Hosts whose schemas live behind I/O resolve every
//! reference a pass could reach up front with [`prefetch`], then run the pass
//! against the filled table.

use std::collections::BTreeSet;
use std::future::Future;

use quill_schema::{McdocType, SchemaTable};

/// Source of schema tables keyed by type path
pub trait SchemaLoader: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Table defining `path`; `None` when the loader has nothing for it
    fn load(&self, path: &str) -> impl Future<Output = Result<Option<SchemaTable>, Self::Error>> + Send;
}

/// Load every type reachable from `roots` that `table` does not define yet.
///
/// Returns the number of tables loaded. Paths the loader does not know stay
/// unresolved, which checkers treat as "no constraint".
pub async fn prefetch<L: SchemaLoader>(
    loader: &L,
    table: &mut SchemaTable,
    roots: &[McdocType],
) -> Result<usize, L::Error> {
    let mut pending = Vec::new();
    for root in roots {
        collect_references(root, table, &mut pending);
    }

    let mut seen = BTreeSet::new();
    let mut loaded = 0;
    while let Some(path) = pending.pop() {
        if !seen.insert(path.clone()) {
            continue;
        }
        if let Some(ty) = table.types.get(&path).cloned() {
            collect_references(&ty, table, &mut pending);
            continue;
        }
        match loader.load(&path).await? {
            Some(more) => {
                tracing::debug!(%path, types = more.types.len(), "prefetched schema");
                table.merge(more);
                loaded += 1;
                if let Some(ty) = table.types.get(&path).cloned() {
                    collect_references(&ty, table, &mut pending);
                }
            }
            None => tracing::trace!(%path, "no schema for reference"),
        }
    }
    Ok(loaded)
}

/// Reference paths mentioned by `ty`, including those of known dispatcher members
fn collect_references(ty: &McdocType, table: &SchemaTable, out: &mut Vec<String>) {
    match ty {
        McdocType::Reference { path } => out.push(path.clone()),
        McdocType::List { item, .. } => collect_references(item, table, out),
        McdocType::Struct { fields } => {
            for field in fields {
                collect_references(&field.ty, table, out);
            }
        }
        McdocType::Union { members } => {
            for member in members {
                collect_references(member, table, out);
            }
        }
        McdocType::Dispatcher { registry, .. } => {
            for member in table.dispatchers.get(registry).into_iter().flat_map(|members| members.values()) {
                collect_references(member, table, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_schema::{parse_schema, SchemaError};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MapLoader {
        sources: HashMap<&'static str, &'static str>,
        requests: Mutex<Vec<String>>,
    }

    impl SchemaLoader for MapLoader {
        type Error = SchemaError;

        async fn load(&self, path: &str) -> Result<Option<SchemaTable>, SchemaError> {
            self.requests.lock().unwrap().push(path.to_string());
            self.sources.get(path).map(|source| parse_schema(source)).transpose()
        }
    }

    #[tokio::test]
    async fn test_prefetch_follows_references() {
        let loader = MapLoader {
            sources: HashMap::from([
                ("Item", "struct Item { tag?: Tag, extra?: Missing }"),
                ("Tag", "struct Tag { name: string }"),
                ("Unused", "struct Unused {}"),
            ]),
            requests: Mutex::new(Vec::new()),
        };
        let mut table = SchemaTable::new();
        let loaded = prefetch(&loader, &mut table, &[McdocType::reference("Item")])
            .await
            .expect("prefetch should succeed");

        assert_eq!(loaded, 2);
        assert!(table.types.contains_key("Item"));
        assert!(table.types.contains_key("Tag"));
        assert!(!table.types.contains_key("Unused"));
        let mut requests = loader.requests.lock().unwrap().clone();
        requests.sort();
        assert_eq!(requests, vec!["Item", "Missing", "Tag"]);
    }

    #[tokio::test]
    async fn test_prefetch_skips_known_types() {
        let loader = MapLoader {
            sources: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        };
        let mut table = SchemaTable::new();
        table.insert_type("Known", McdocType::Boolean);
        let loaded = prefetch(&loader, &mut table, &[McdocType::reference("Known")])
            .await
            .expect("prefetch should succeed");
        assert_eq!(loaded, 0);
        assert!(loader.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prefetch_propagates_loader_errors() {
        let loader = MapLoader {
            sources: HashMap::from([("Broken", "struct {")]),
            requests: Mutex::new(Vec::new()),
        };
        let mut table = SchemaTable::new();
        let result = prefetch(&loader, &mut table, &[McdocType::reference("Broken")]).await;
        assert!(result.is_err());
    }
}
