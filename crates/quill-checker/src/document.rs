//! Whole-document checker for JSON and SNBT files
//!
//! The type of a document is picked from its project-relative path:
//! `data/<namespace>/<category...>/<name>.json` maps through the project's
//! category table, and `pack.mcmeta` has a built-in type.

use quill_ast::{AstNode, NumericKind};
use quill_schema::{McdocType, NumericRange, StructField};

use crate::mcdoc::{check_type, CheckOptions};
use crate::{CheckerContext, Project};

const PACK_MCMETA: &str = "pack.mcmeta";

/// Checker for document roots; embedded values are left to their host checker
pub fn file(node: &mut AstNode, ctx: &mut CheckerContext<'_>) {
    if node.parent.is_some() {
        return;
    }
    let Some(path) = ctx.doc_path else {
        return;
    };
    let Some(ty) = document_type(path, ctx.project) else {
        tracing::trace!(path, "no type for document");
        return;
    };
    check_type(node, &ty, ctx, CheckOptions::default());
}

pub(crate) fn document_type(path: &str, project: &Project) -> Option<McdocType> {
    if path == PACK_MCMETA || path.ends_with(&format!("/{}", PACK_MCMETA)) {
        return Some(pack_mcmeta());
    }
    let category = category_of(path, project)?;
    project.categories.get(category).cloned()
}

/// Longest registered category the path lies under
pub fn category_of<'p>(path: &str, project: &'p Project) -> Option<&'p str> {
    let parts: Vec<&str> = path.split('/').collect();
    let data = parts.iter().position(|part| *part == "data")?;
    // namespace, then at least one category directory, then the file
    let dirs = parts.get(data + 2..parts.len().checked_sub(1)?)?;
    (1..=dirs.len()).rev().find_map(|n| {
        let candidate = dirs[..n].join("/");
        project
            .categories
            .get_key_value(candidate.as_str())
            .map(|(key, _)| key.as_str())
    })
}

fn pack_mcmeta() -> McdocType {
    McdocType::structure(vec![StructField::required(
        "pack",
        McdocType::structure(vec![
            StructField::required(
                "pack_format",
                McdocType::numeric_in(NumericKind::Int, NumericRange::at_least(1.0)),
            ),
            StructField::required("description", McdocType::reference("minecraft:text_component")),
        ]),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{check_document, build_default_registry};
    use pretty_assertions::assert_eq;
    use quill_parser::command::CommandTree;
    use quill_parser::{parse_document, Grammar};
    use quill_schema::{SchemaTable, TagTable};

    fn project() -> Project {
        let mut project = Project::default();
        project.categories.insert("worldgen".into(), McdocType::Any);
        project
            .categories
            .insert("worldgen/biome".into(), McdocType::reference("minecraft:biome"));
        project.categories.insert(
            "tags/item".into(),
            McdocType::structure(vec![StructField::required("values", McdocType::list(McdocType::string()))]),
        );
        project
    }

    fn check(path: &str, text: &str) -> Vec<String> {
        let meta = build_default_registry();
        let (schema, tags, project) = (SchemaTable::new(), TagTable::new(), project());
        let doc = parse_document(text, Grammar::Json, &CommandTree::default(), None);
        let mut root = doc.root;
        let mut ctx = CheckerContext::new(&meta, &schema, &tags, &project).with_path(path);
        check_document(&mut root, &mut ctx);
        ctx.err.into_vec().into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_category_is_longest_prefix() {
        let project = project();
        assert_eq!(
            category_of("data/minecraft/worldgen/biome/plains.json", &project),
            Some("worldgen/biome")
        );
        assert_eq!(
            category_of("pack/data/foo/worldgen/noise/a.json", &project),
            Some("worldgen")
        );
        assert_eq!(category_of("data/foo/recipe/a.json", &project), None);
        assert_eq!(category_of("data/foo.json", &project), None);
    }

    #[test]
    fn test_category_type_is_checked() {
        assert_eq!(
            check("data/foo/tags/item/logs.json", r#"{"values": [1]}"#),
            vec!["expected a string"]
        );
        assert!(check("data/foo/recipe/a.json", r#"{"values": [1]}"#).is_empty());
    }

    #[test]
    fn test_pack_mcmeta() {
        assert_eq!(
            check("pack.mcmeta", r#"{"pack": {"pack_format": 0, "description": "x"}}"#),
            vec!["expected a value in range 1.."]
        );
        assert_eq!(check("pack.mcmeta", "{}"), vec!["missing required key pack"]);
    }
}
