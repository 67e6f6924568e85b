//! Entity type resolution for entity arguments

use quill_ast::{resource, AstNode, NodeKind};
use quill_schema::RegistryService;

const PLAYER: &str = "minecraft:player";

/// Entity types an entity argument can select.
///
/// `None` means unconstrained. Player names and players-only selectors give
/// `{minecraft:player}`. Otherwise `type=` arguments are folded in order: the
/// first non-inverted value sets the candidates and later ones intersect
/// with them. Inverted values are ignored.
pub fn entity_types(entity: &AstNode, registry: &dyn RegistryService) -> Option<Vec<String>> {
    let NodeKind::Entity(payload) = &entity.kind else {
        return None;
    };
    if payload.player_name.is_some() {
        return Some(vec![PLAYER.to_string()]);
    }

    let selector = entity.children.first()?;
    let NodeKind::Selector(variable) = &selector.kind else {
        return None;
    };
    if variable.players_only() {
        return Some(vec![PLAYER.to_string()]);
    }

    let arguments = selector
        .children
        .iter()
        .find(|child| matches!(child.kind, NodeKind::SelectorArguments))?;

    let mut types: Option<Vec<String>> = None;
    for pair in arguments.pairs() {
        if pair.pair_key().and_then(|key| key.string_value()) != Some("type") {
            continue;
        }
        let Some(value) = pair.pair_value() else {
            continue;
        };
        if matches!(value.kind, NodeKind::SelectorValue(v) if v.inverted) {
            continue;
        }
        let Some(id) = value.children.first().and_then(|node| node.resource_location()) else {
            continue;
        };

        let full = id.to_full();
        let values = match full.strip_prefix(resource::TAG_PREFIX) {
            Some(tag) => registry.tag_values("tag/entity_type", tag),
            None => vec![full],
        };
        types = Some(match types {
            None => values,
            Some(current) => current.into_iter().filter(|t| values.contains(t)).collect(),
        });
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_parser::command::entity;
    use quill_parser::{ParserContext, Source};
    use quill_schema::TagTable;

    fn types(text: &str) -> Option<Vec<String>> {
        let mut tags = TagTable::new();
        tags.insert_tag("tag/entity_type", "farm", ["cow", "pig", "sheep"]);
        let mut ctx = ParserContext::new();
        let node = entity(&mut Source::new(text), &mut ctx);
        assert!(ctx.err.is_empty(), "{:?}", ctx.err.diagnostics());
        entity_types(&node, &tags)
    }

    #[test]
    fn test_conflicting_types_give_empty_set() {
        assert_eq!(types("@e[type=cow,type=pig]"), Some(vec![]));
    }

    #[test]
    fn test_tag_then_id_intersects() {
        assert_eq!(
            types("@e[type=#farm,type=pig]"),
            Some(vec!["minecraft:pig".to_string()])
        );
    }

    #[test]
    fn test_inverted_types_are_ignored() {
        assert_eq!(
            types("@e[type=!cow,type=minecraft:zombie]"),
            Some(vec!["minecraft:zombie".to_string()])
        );
        assert_eq!(types("@e[type=!cow]"), None);
    }

    #[test]
    fn test_players() {
        assert_eq!(types("Steve"), Some(vec![PLAYER.to_string()]));
        assert_eq!(types("@a[type=cow]"), Some(vec![PLAYER.to_string()]));
        assert_eq!(types("@s"), None);
    }
}
