//! Command signatures
//!
//! A command is a flat sequence of slots separated by single spaces. The tree
//! is data: hosts can deserialize their own from JSON, or start from
//! [`CommandTree::builtin`].

use serde::{Deserialize, Serialize};

/// How an argument slot is parsed and later checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgumentKind {
    /// Selector or player name
    Entity,
    ItemStack,
    ItemPredicate,
    Block {
        #[serde(default)]
        is_predicate: bool,
    },
    Particle,
    /// Inline JSON validated against a schema reference
    Json { type_ref: String },
    /// SNBT compound dispatched on a registry
    Nbt {
        dispatcher: String,
        #[serde(default)]
        dispatched_by: Option<String>,
        #[serde(default)]
        is_predicate: bool,
    },
    /// Either a resource id or an inline SNBT definition of that resource
    NbtResource { category: String },
    ResourceLocation {
        category: String,
        #[serde(default)]
        allow_tag: bool,
    },
    Integer {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    /// One coordinate: a number, optionally prefixed by `~` or `^`
    Coordinate,
    /// Unquoted word
    Word,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Literal(String),
    Argument { name: String, kind: ArgumentKind },
}

impl Slot {
    /// What to ask for when the slot is missing
    pub fn describe(&self) -> String {
        match self {
            Slot::Literal(value) => format!("'{}'", value),
            Slot::Argument { name, .. } => format!("<{}>", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandSignature {
    pub slots: Vec<Slot>,
}

impl CommandSignature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(mut self, value: &str) -> Self {
        self.slots.push(Slot::Literal(value.to_string()));
        self
    }

    pub fn argument(mut self, name: &str, kind: ArgumentKind) -> Self {
        self.slots.push(Slot::Argument {
            name: name.to_string(),
            kind,
        });
        self
    }

    fn position(self) -> Self {
        self.argument("x", ArgumentKind::Coordinate)
            .argument("y", ArgumentKind::Coordinate)
            .argument("z", ArgumentKind::Coordinate)
    }

    /// Name of the first slot, which must be a literal
    pub fn head(&self) -> Option<&str> {
        match self.slots.first() {
            Some(Slot::Literal(value)) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandTree {
    pub commands: Vec<CommandSignature>,
}

impl CommandTree {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Signatures whose first literal is `head`
    pub fn candidates<'a>(&'a self, head: &'a str) -> impl Iterator<Item = &'a CommandSignature> {
        self.commands.iter().filter(move |sig| sig.head() == Some(head))
    }

    /// The commands whose arguments carry schema-checked data
    pub fn builtin() -> Self {
        use ArgumentKind::*;

        let resource = |category: &str| ResourceLocation {
            category: category.to_string(),
            allow_tag: false,
        };
        let nbt = |dispatcher: &str, dispatched_by: Option<&str>, is_predicate: bool| Nbt {
            dispatcher: dispatcher.to_string(),
            dispatched_by: dispatched_by.map(str::to_string),
            is_predicate,
        };

        let commands = vec![
            CommandSignature::new()
                .literal("give")
                .argument("targets", Entity)
                .argument("item", ItemStack),
            CommandSignature::new()
                .literal("give")
                .argument("targets", Entity)
                .argument("item", ItemStack)
                .argument("count", Integer { min: Some(1), max: None }),
            CommandSignature::new()
                .literal("clear")
                .argument("targets", Entity)
                .argument("item", ItemPredicate),
            CommandSignature::new().literal("kill").argument("targets", Entity),
            CommandSignature::new()
                .literal("summon")
                .argument("entity", resource("entity_type"))
                .position()
                .argument("nbt", nbt("minecraft:entity", Some("entity"), false)),
            CommandSignature::new()
                .literal("summon")
                .argument("entity", resource("entity_type"))
                .position(),
            CommandSignature::new()
                .literal("summon")
                .argument("entity", resource("entity_type")),
            CommandSignature::new().literal("particle").argument("name", Particle),
            CommandSignature::new()
                .literal("particle")
                .argument("name", Particle)
                .position(),
            CommandSignature::new()
                .literal("tellraw")
                .argument("targets", Entity)
                .argument(
                    "message",
                    Json {
                        type_ref: "minecraft:text_component".to_string(),
                    },
                ),
            CommandSignature::new()
                .literal("data")
                .literal("merge")
                .literal("storage")
                .argument("target", resource("storage"))
                .argument("nbt", nbt("minecraft:storage", Some("target"), false)),
            CommandSignature::new()
                .literal("data")
                .literal("merge")
                .literal("entity")
                .argument("target", Entity)
                .argument("nbt", nbt("minecraft:entity", Some("target"), false)),
            CommandSignature::new()
                .literal("data")
                .literal("merge")
                .literal("block")
                .position()
                .argument("nbt", nbt("minecraft:block", None, false)),
            CommandSignature::new()
                .literal("setblock")
                .position()
                .argument("block", Block { is_predicate: false }),
            CommandSignature::new()
                .literal("execute")
                .literal("if")
                .literal("block")
                .position()
                .argument("block", Block { is_predicate: true }),
            CommandSignature::new()
                .literal("execute")
                .literal("if")
                .literal("entity")
                .argument("targets", Entity),
            CommandSignature::new()
                .literal("loot")
                .literal("give")
                .argument("players", Entity)
                .literal("loot")
                .argument(
                    "loot_table",
                    NbtResource {
                        category: "loot_table".to_string(),
                    },
                ),
            CommandSignature::new().literal("function").argument(
                "name",
                ResourceLocation {
                    category: "function".to_string(),
                    allow_tag: true,
                },
            ),
        ];
        Self { commands }
    }
}
