//! Structural type descriptors
//!
//! An [`McdocType`] describes the shape a value must have. Descriptors are
//! produced by the schema language or deserialized from JSON tables and are
//! read-only once handed to a checker.

use std::fmt;

use quill_ast::NumericKind;
use serde::{Deserialize, Serialize};

/// A structural type descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum McdocType {
    /// Accepts every value
    Any,
    Boolean,
    Numeric {
        kind: NumericKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<NumericRange>,
    },
    String {
        /// Closed set of accepted values
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<NumericRange>,
    },
    List {
        item: Box<McdocType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<NumericRange>,
    },
    /// Typed numeric array: `byte[]`, `int[]`, `long[]`
    Array {
        kind: NumericKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<NumericRange>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<StructField>,
    },
    /// Ordered candidates; the first member that accepts wins
    Union {
        #[serde(default)]
        members: Vec<McdocType>,
    },
    /// Member of `registry` selected by the resolved index keys
    Dispatcher {
        registry: String,
        parallel_indices: Vec<ParallelIndex>,
    },
    /// Named alias resolved through the schema service
    Reference { path: String },
}

impl McdocType {
    pub fn numeric(kind: NumericKind) -> Self {
        McdocType::Numeric { kind, range: None }
    }

    pub fn numeric_in(kind: NumericKind, range: NumericRange) -> Self {
        McdocType::Numeric {
            kind,
            range: Some(range),
        }
    }

    pub fn string() -> Self {
        McdocType::String {
            pool: None,
            length: None,
        }
    }

    pub fn string_pool<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        McdocType::String {
            pool: Some(values.into_iter().map(Into::into).collect()),
            length: None,
        }
    }

    pub fn list(item: McdocType) -> Self {
        McdocType::List {
            item: Box::new(item),
            length: None,
        }
    }

    pub fn structure(fields: Vec<StructField>) -> Self {
        McdocType::Struct { fields }
    }

    pub fn union(members: Vec<McdocType>) -> Self {
        McdocType::Union { members }
    }

    pub fn reference(path: impl Into<String>) -> Self {
        McdocType::Reference { path: path.into() }
    }

    /// Dispatcher with a single static key
    pub fn dispatch_static(registry: impl Into<String>, key: impl Into<String>) -> Self {
        McdocType::Dispatcher {
            registry: registry.into(),
            parallel_indices: vec![ParallelIndex::Static(key.into())],
        }
    }

    /// Dispatcher keyed by several static keys at once
    pub fn dispatch_keys<I, S>(registry: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        McdocType::Dispatcher {
            registry: registry.into(),
            parallel_indices: keys.into_iter().map(|k| ParallelIndex::Static(k.into())).collect(),
        }
    }

    /// Fields of a struct type
    pub fn fields(&self) -> Option<&[StructField]> {
        match self {
            McdocType::Struct { fields } => Some(fields),
            _ => None,
        }
    }

    pub fn field(&self, key: &str) -> Option<&StructField> {
        self.fields()?.iter().find(|field| field.key == key)
    }

    /// Short name of the value shape, used in "expected ..." messages
    pub fn expectation(&self) -> &'static str {
        match self {
            McdocType::Any => "a value",
            McdocType::Boolean => "a boolean",
            McdocType::Numeric { kind, .. } => match kind {
                NumericKind::Byte => "a byte",
                NumericKind::Short => "a short",
                NumericKind::Int => "an int",
                NumericKind::Long => "a long",
                NumericKind::Float => "a float",
                NumericKind::Double => "a double",
            },
            McdocType::String { .. } => "a string",
            McdocType::List { .. } => "a list",
            McdocType::Array { kind, .. } => match kind {
                NumericKind::Byte => "a byte array",
                NumericKind::Long => "a long array",
                _ => "an int array",
            },
            McdocType::Struct { .. } => "a compound",
            McdocType::Union { .. } => "one of the union members",
            McdocType::Dispatcher { .. } | McdocType::Reference { .. } => "a value",
        }
    }
}

/// A field of a struct type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub key: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(rename = "value")]
    pub ty: McdocType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl StructField {
    pub fn required(key: impl Into<String>, ty: McdocType) -> Self {
        Self {
            key: key.into(),
            optional: false,
            deprecated: false,
            ty,
            doc: None,
        }
    }

    pub fn optional(key: impl Into<String>, ty: McdocType) -> Self {
        Self {
            optional: true,
            ..Self::required(key, ty)
        }
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// One index key of a dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParallelIndex {
    /// A fixed registry key
    Static(String),
    /// The value of a sibling field of the struct being validated
    Field(String),
}

/// Numeric bounds, each end optionally exclusive
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub min_exclusive: bool,
    #[serde(default)]
    pub max_exclusive: bool,
}

impl NumericRange {
    /// Inclusive on both ends
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            ..Self::default()
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above = match self.min {
            Some(min) if self.min_exclusive => value > min,
            Some(min) => value >= min,
            None => true,
        };
        let below = match self.max {
            Some(max) if self.max_exclusive => value < max,
            Some(max) => value <= max,
            None => true,
        };
        above && below
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(min), Some(max), false, false) =
            (self.min, self.max, self.min_exclusive, self.max_exclusive)
        {
            if min == max {
                return write!(f, "{}", min);
            }
        }
        if let Some(min) = self.min {
            write!(f, "{}", min)?;
        }
        if self.min_exclusive {
            f.write_str("<")?;
        }
        f.write_str("..")?;
        if self.max_exclusive {
            f.write_str("<")?;
        }
        if let Some(max) = self.max {
            write!(f, "{}", max)?;
        }
        Ok(())
    }
}

impl fmt::Display for ParallelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParallelIndex::Static(key) => f.write_str(key),
            ParallelIndex::Field(field) => write!(f, "[{}]", field),
        }
    }
}

/// Rendered signature, shown as completion detail
impl fmt::Display for McdocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McdocType::Any => f.write_str("any"),
            McdocType::Boolean => f.write_str("boolean"),
            McdocType::Numeric { kind, range } => {
                f.write_str(kind.name())?;
                write_range(f, range)
            }
            McdocType::String { pool: Some(pool), .. } => {
                let values: Vec<_> = pool.iter().map(|v| format!("{:?}", v)).collect();
                write!(f, "({})", values.join(" | "))
            }
            McdocType::String { pool: None, length } => {
                f.write_str("string")?;
                write_range(f, length)
            }
            McdocType::List { item, length } => {
                write!(f, "[{}]", item)?;
                write_range(f, length)
            }
            McdocType::Array { kind, length } => {
                write!(f, "{}[]", kind.name())?;
                write_range(f, length)
            }
            McdocType::Struct { fields } if fields.is_empty() => f.write_str("struct {}"),
            McdocType::Struct { fields } => {
                f.write_str("struct { ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    let mark = if field.optional { "?" } else { "" };
                    write!(f, "{}{}: {}", field.key, mark, field.ty)?;
                }
                f.write_str(" }")
            }
            McdocType::Union { members } => {
                let members: Vec<_> = members.iter().map(ToString::to_string).collect();
                write!(f, "({})", members.join(" | "))
            }
            McdocType::Dispatcher {
                registry,
                parallel_indices,
            } => {
                let keys: Vec<_> = parallel_indices.iter().map(ToString::to_string).collect();
                write!(f, "{}[{}]", registry, keys.join(", "))
            }
            McdocType::Reference { path } => f.write_str(path),
        }
    }
}

fn write_range(f: &mut fmt::Formatter<'_>, range: &Option<NumericRange>) -> fmt::Result {
    match range {
        Some(range) => write!(f, " @ {}", range),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_range_contains() {
        let range = NumericRange::between(0.0, 3.0);
        assert!(range.contains(0.0));
        assert!(range.contains(3.0));
        assert!(!range.contains(3.5));

        let exclusive = NumericRange {
            min: Some(0.0),
            max: Some(1.0),
            min_exclusive: true,
            max_exclusive: true,
        };
        assert!(!exclusive.contains(0.0));
        assert!(exclusive.contains(0.5));
        assert!(!exclusive.contains(1.0));
    }

    #[test]
    fn test_render_signatures() {
        let ty = McdocType::structure(vec![
            StructField::required("id", McdocType::string()),
            StructField::optional("Count", McdocType::numeric_in(NumericKind::Byte, NumericRange::at_least(0.0))),
        ]);
        assert_eq!(ty.to_string(), "struct { id: string, Count?: byte @ 0.. }");
        assert_eq!(McdocType::list(McdocType::Boolean).to_string(), "[boolean]");
        assert_eq!(
            McdocType::string_pool(["red", "blue"]).to_string(),
            r#"("red" | "blue")"#
        );
        let dispatcher = McdocType::Dispatcher {
            registry: "minecraft:entity".into(),
            parallel_indices: vec![ParallelIndex::Field("id".into())],
        };
        assert_eq!(dispatcher.to_string(), "minecraft:entity[[id]]");
    }

    #[test]
    fn test_render_ranges() {
        assert_eq!(NumericRange::between(1.0, 1.0).to_string(), "1");
        assert_eq!(NumericRange::at_most(2.5).to_string(), "..2.5");
        let exclusive = NumericRange {
            min: Some(0.0),
            max: Some(1.0),
            min_exclusive: true,
            max_exclusive: false,
        };
        assert_eq!(exclusive.to_string(), "0<..1");
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"type":"struct","fields":[{"key":"a","optional":true,"value":{"type":"numeric","kind":"int"}}]}"#;
        let ty: McdocType = serde_json::from_str(json).expect("valid descriptor");
        let field = ty.field("a").expect("field a");
        assert!(field.optional);
        assert_eq!(field.ty, McdocType::numeric(NumericKind::Int));
    }
}
