//! Syntax tree nodes shared by every grammar

use serde::{Deserialize, Serialize};

use crate::{resource, NodeId, Range};

/// A node in a syntax tree.
///
/// Every node owns its children. `id` and `parent` are filled in by
/// [`set_parents`](crate::set_parents) after parsing; parsers leave them detached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    pub kind: NodeKind,
    pub range: Range,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
}

impl AstNode {
    pub fn new(kind: NodeKind, range: Range) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
            id: NodeId::DETACHED,
            parent: None,
        }
    }

    pub fn with_children(kind: NodeKind, range: Range, children: Vec<AstNode>) -> Self {
        Self {
            children,
            ..Self::new(kind, range)
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Key of a `Pair` node
    pub fn pair_key(&self) -> Option<&AstNode> {
        match &self.kind {
            NodeKind::Pair(pair) if pair.has_key => self.children.first(),
            _ => None,
        }
    }

    /// Value of a `Pair` node
    pub fn pair_value(&self) -> Option<&AstNode> {
        match &self.kind {
            NodeKind::Pair(pair) if pair.has_value => self.children.last(),
            _ => None,
        }
    }

    pub fn pair_value_mut(&mut self) -> Option<&mut AstNode> {
        match &self.kind {
            NodeKind::Pair(pair) if pair.has_value => self.children.last_mut(),
            _ => None,
        }
    }

    /// Pairs of a collection node, in document order
    pub fn pairs(&self) -> impl Iterator<Item = &AstNode> {
        self.children
            .iter()
            .filter(|child| matches!(child.kind, NodeKind::Pair(_)))
    }

    /// String content of any string-like node
    pub fn string_value(&self) -> Option<&str> {
        self.kind.string().map(|s| s.value.as_str())
    }

    pub fn resource_location(&self) -> Option<&ResourceLocationNode> {
        match &self.kind {
            NodeKind::ResourceLocation(id) => Some(id),
            _ => None,
        }
    }

    /// First child matching the predicate
    pub fn find_child(&self, pred: impl Fn(&AstNode) -> bool) -> Option<&AstNode> {
        self.children.iter().find(|child| pred(child))
    }

    pub fn find_child_mut(&mut self, pred: impl Fn(&AstNode) -> bool) -> Option<&mut AstNode> {
        self.children.iter_mut().find(|child| pred(child))
    }
}

/// Discriminator of a node.
///
/// The set is closed: checkers and completers match on it exhaustively and
/// the registry keys them by [`NodeKind::tag`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // === Primitives ===
    Boolean(bool),
    Float(f64),
    Integer(i64),
    String(StringNode),
    ResourceLocation(ResourceLocationNode),
    /// An exact keyword such as a command literal
    Literal(String),
    /// `key SEP value` inside any delimited collection
    Pair(PairNode),
    /// Placeholder occupying a position the parser could not fill
    Error,

    // === Tag-based object notation (SNBT) ===
    NbtCompound,
    NbtList,
    /// `[B; ...]`, `[I; ...]`, `[L; ...]`
    NbtArray(NumericKind),
    NbtNumber(NbtNumber),
    NbtString(StringNode),

    // === JSON-like config ===
    JsonObject,
    JsonArray,
    JsonString(StringNode),
    JsonNumber(f64),
    JsonBoolean(bool),
    JsonNull,

    // === Command language ===
    /// A whole function file, one command per line
    FunctionFile,
    Command(CommandNode),
    /// One slot of a command, wrapping a literal or argument node
    CommandChild(CommandChildNode),
    Entity(EntityNode),
    Selector(SelectorNode),
    SelectorArguments,
    /// A selector argument value, possibly negated with `!`
    SelectorValue(SelectorValueNode),
    ItemStack,
    ItemComponents,
    ItemPredicate,
    ComponentTests,
    ComponentTestGroup,
    ComponentTest(ComponentTestNode),
    Block(BlockNode),
    BlockStates,
    Particle,
    JsonArgument(JsonArgumentNode),
    NbtArgument(NbtArgumentNode),
    NbtResource(NbtResourceNode),
}

impl NodeKind {
    /// Stable tag used to register checkers and completers
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Boolean(_) => "boolean",
            NodeKind::Float(_) => "float",
            NodeKind::Integer(_) => "integer",
            NodeKind::String(_) => "string",
            NodeKind::ResourceLocation(_) => "resource_location",
            NodeKind::Literal(_) => "literal",
            NodeKind::Pair(_) => "pair",
            NodeKind::Error => "error",
            NodeKind::NbtCompound => "nbt:compound",
            NodeKind::NbtList => "nbt:list",
            NodeKind::NbtArray(kind) => match kind {
                NumericKind::Byte => "nbt:byte_array",
                NumericKind::Long => "nbt:long_array",
                _ => "nbt:int_array",
            },
            NodeKind::NbtNumber(number) => match number.kind {
                NumericKind::Byte => "nbt:byte",
                NumericKind::Short => "nbt:short",
                NumericKind::Int => "nbt:int",
                NumericKind::Long => "nbt:long",
                NumericKind::Float => "nbt:float",
                NumericKind::Double => "nbt:double",
            },
            NodeKind::NbtString(_) => "nbt:string",
            NodeKind::JsonObject => "json:object",
            NodeKind::JsonArray => "json:array",
            NodeKind::JsonString(_) => "json:string",
            NodeKind::JsonNumber(_) => "json:number",
            NodeKind::JsonBoolean(_) => "json:boolean",
            NodeKind::JsonNull => "json:null",
            NodeKind::FunctionFile => "mcfunction:file",
            NodeKind::Command(_) => "mcfunction:command",
            NodeKind::CommandChild(_) => "mcfunction:command_child",
            NodeKind::Entity(_) => "mcfunction:entity",
            NodeKind::Selector(_) => "mcfunction:entity_selector",
            NodeKind::SelectorArguments => "mcfunction:entity_selector/arguments",
            NodeKind::SelectorValue(_) => "mcfunction:entity_selector/value",
            NodeKind::ItemStack => "mcfunction:item_stack",
            NodeKind::ItemComponents => "mcfunction:item_stack/components",
            NodeKind::ItemPredicate => "mcfunction:item_predicate",
            NodeKind::ComponentTests => "mcfunction:item_predicate/tests",
            NodeKind::ComponentTestGroup => "mcfunction:item_predicate/all_of",
            NodeKind::ComponentTest(_) => "mcfunction:item_predicate/test",
            NodeKind::Block(_) => "mcfunction:block",
            NodeKind::BlockStates => "mcfunction:block/states",
            NodeKind::Particle => "mcfunction:particle",
            NodeKind::JsonArgument(_) => "mcfunction:json",
            NodeKind::NbtArgument(_) => "mcfunction:nbt",
            NodeKind::NbtResource(_) => "mcfunction:nbt_resource",
        }
    }

    /// String payload of `String`, `NbtString` and `JsonString`
    pub fn string(&self) -> Option<&StringNode> {
        match self {
            NodeKind::String(s) | NodeKind::NbtString(s) | NodeKind::JsonString(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        self.string().is_some()
    }
}

/// Payload of string-like nodes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StringNode {
    /// Unescaped content
    pub value: String,
    /// Quote character, `None` for unquoted strings
    pub quote: Option<char>,
    /// Source offset of every byte boundary of `value` (`value.len() + 1` entries)
    #[serde(skip)]
    pub value_map: Vec<usize>,
}

impl StringNode {
    /// Map an offset inside `value` back to the enclosing source
    pub fn to_source_offset(&self, offset: usize) -> usize {
        match self.value_map.get(offset) {
            Some(mapped) => *mapped,
            None => self.value_map.last().copied().unwrap_or(offset),
        }
    }
}

/// Payload of a `namespace:path` identifier
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceLocationNode {
    pub namespace: Option<String>,
    pub path: Vec<String>,
    /// Written with the `#` tag prefix
    pub is_tag: bool,
    /// Registry the identifier belongs to, e.g. `entity_type` or `item`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ResourceLocationNode {
    /// `namespace:path`, with the tag prefix when present
    pub fn to_full(&self) -> String {
        let namespace = self.namespace.as_deref().unwrap_or(resource::DEFAULT_NAMESPACE);
        let id = format!("{}:{}", namespace, self.path.join("/"));
        if self.is_tag {
            format!("{}{}", resource::TAG_PREFIX, id)
        } else {
            id
        }
    }

    /// `path` alone when the namespace is the default one
    pub fn to_short(&self) -> String {
        resource::shorten(&self.to_full())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PairNode {
    pub has_key: bool,
    pub has_value: bool,
    /// Range of the key/value separator once it has been read
    pub sep: Option<Range>,
}

/// Width of a numeric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl NumericKind {
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            NumericKind::Byte | NumericKind::Short | NumericKind::Int | NumericKind::Long
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericKind::Byte => "byte",
            NumericKind::Short => "short",
            NumericKind::Int => "int",
            NumericKind::Long => "long",
            NumericKind::Float => "float",
            NumericKind::Double => "double",
        }
    }

    /// Inclusive bounds representable by the kind
    pub fn bounds(self) -> (f64, f64) {
        match self {
            NumericKind::Byte => (i8::MIN as f64, i8::MAX as f64),
            NumericKind::Short => (i16::MIN as f64, i16::MAX as f64),
            NumericKind::Int => (i32::MIN as f64, i32::MAX as f64),
            NumericKind::Long => (i64::MIN as f64, i64::MAX as f64),
            NumericKind::Float => (f32::MIN as f64, f32::MAX as f64),
            NumericKind::Double => (f64::MIN, f64::MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NbtNumber {
    pub value: f64,
    pub kind: NumericKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandNode {
    /// Range of a leading `/`
    pub slash: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandChildNode {
    /// Names of the command tree nodes leading to this slot
    pub path: Vec<String>,
}

impl CommandChildNode {
    pub fn name(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityNode {
    /// Set when the argument is a plain player name instead of a selector
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectorNode {
    /// The letter after `@`
    pub variable: char,
}

impl SelectorNode {
    /// `@a`, `@p` and `@r` only ever select players
    pub fn players_only(&self) -> bool {
        matches!(self.variable, 'a' | 'p' | 'r')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectorValueNode {
    pub inverted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentTestKind {
    /// `id` alone
    Exists,
    /// `id=value`
    Exact,
    /// `id~value`
    Subpredicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentTestNode {
    pub test: ComponentTestKind,
    pub negated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockNode {
    pub is_predicate: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonArgumentNode {
    /// Schema reference the JSON value is validated against
    pub type_ref: String,
}

/// How an NBT argument picks the type it is validated against
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NbtProperties {
    /// Registry dispatched on, e.g. `minecraft:entity`
    pub dispatcher: String,
    /// Name of the sibling argument that supplies the dispatch key
    pub dispatched_by: Option<String>,
    pub is_predicate: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NbtArgumentNode {
    pub properties: Option<NbtProperties>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NbtResourceNode {
    /// Resource category, e.g. `loot_table`
    pub category: String,
}
