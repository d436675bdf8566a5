use std::fmt;
use std::sync::Arc;

use super::value::Value;

/// Scalar types converted through their `FromStr` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
        }
    }
}

/// An enumeration type: ordered member names with their discriminants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    members: Vec<(String, i64)>,
}

impl EnumDef {
    /// Members get discriminants 0, 1, 2, ... in declaration order.
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = members
            .into_iter()
            .zip(0i64..)
            .map(|(m, v)| (m.into(), v))
            .collect();
        Self {
            name: name.into(),
            members,
        }
    }

    /// Members with explicit discriminants.
    pub fn with_values<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(|(m, v)| (m.into(), v)).collect(),
        }
    }

    pub fn members(&self) -> impl Iterator<Item = (usize, &str, i64)> + '_ {
        self.members
            .iter()
            .enumerate()
            .map(|(i, (name, value))| (i, name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Declared type of a named-object parameter. A catalog entry satisfies it
/// when the entry's type lineage contains this name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectType(pub String);

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Declared type tag of a command parameter. Each tag maps to exactly one
/// conversion strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    Bool,
    Enum(Arc<EnumDef>),
    Object(ObjectType),
    Text,
    Scalar(ScalarKind),
    /// Float vector with 2 to 4 components.
    Vector(usize),
    /// A declared type the console cannot convert. The command still
    /// registers, but this parameter never resolves.
    Unsupported(String),
}

impl ParamType {
    pub fn enumeration(def: EnumDef) -> Self {
        ParamType::Enum(Arc::new(def))
    }

    pub fn object(type_name: impl Into<String>) -> Self {
        ParamType::Object(ObjectType::new(type_name))
    }

    pub const INT: ParamType = ParamType::Scalar(ScalarKind::I32);
    pub const FLOAT: ParamType = ParamType::Scalar(ScalarKind::F32);
    pub const VEC2: ParamType = ParamType::Vector(2);
    pub const VEC3: ParamType = ParamType::Vector(3);
    pub const VEC4: ParamType = ParamType::Vector(4);

    /// Symbolic types resolve against a finite set of names rather than
    /// free-form text.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, ParamType::Bool | ParamType::Enum(_) | ParamType::Object(_))
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => f.write_str("bool"),
            ParamType::Enum(def) => f.write_str(&def.name),
            ParamType::Object(ty) => f.write_str(ty.name()),
            ParamType::Text => f.write_str("string"),
            ParamType::Scalar(kind) => f.write_str(kind.name()),
            ParamType::Vector(n) => write!(f, "vec{n}"),
            ParamType::Unsupported(name) => write!(f, "{name}?"),
        }
    }
}

/// Schema entry for one command parameter: name, type, optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: ParamType,
    pub default: Option<Value>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}
