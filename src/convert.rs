//! Argument converters.
//!
//! Every declared parameter type maps to exactly one strategy, chosen by the
//! type tag and never sniffed from the text: boolean literals, enumeration
//! members, named catalog objects, `FromStr` scalars and float vectors.
//! Conversion failures are plain data; nothing here panics or logs.

use std::str::FromStr;

use thiserror::Error;

use crate::input::tokenizer::eq_ignore_case;
use crate::model::{EnumDef, EnumValue, ObjectType, ParamType, ScalarKind, Value};
use crate::objects::ObjectCatalog;

pub const TRUE_LITERAL: &str = "true";
pub const FALSE_LITERAL: &str = "false";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionFailure {
    #[error("'{text}' is not a boolean literal")]
    NotBool { text: String },
    #[error("'{text}' is not a member of {enumeration}")]
    NotMember { enumeration: String, text: String },
    #[error("no {ty} named '{text}'")]
    NoSuchObject { ty: String, text: String },
    #[error("'{text}' does not parse as {ty}")]
    Parse { ty: &'static str, text: String },
    #[error("expected {expected} components, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("empty text")]
    Empty,
    #[error("parameters of type '{0}' cannot be converted")]
    Unsupported(String),
}

/// Convert `raw` to a value of the declared type.
pub fn convert(
    ty: &ParamType,
    raw: &str,
    objects: &ObjectCatalog,
) -> Result<Value, ConversionFailure> {
    match ty {
        ParamType::Bool => convert_bool(raw).map(Value::Bool),
        ParamType::Enum(def) => convert_enum(def, raw).map(Value::Enum),
        ParamType::Object(ty) => convert_object(ty, raw, objects),
        ParamType::Text => convert_text(raw),
        ParamType::Scalar(kind) => convert_scalar(*kind, raw),
        ParamType::Vector(arity) => convert_vector(*arity, raw),
        ParamType::Unsupported(name) => Err(ConversionFailure::Unsupported(name.clone())),
    }
}

pub fn convert_bool(raw: &str) -> Result<bool, ConversionFailure> {
    if eq_ignore_case(raw, TRUE_LITERAL) {
        Ok(true)
    } else if eq_ignore_case(raw, FALSE_LITERAL) {
        Ok(false)
    } else {
        Err(ConversionFailure::NotBool {
            text: raw.to_string(),
        })
    }
}

pub fn convert_enum(def: &EnumDef, raw: &str) -> Result<EnumValue, ConversionFailure> {
    def.members()
        .find(|(_, name, _)| eq_ignore_case(name, raw))
        .map(|(ordinal, name, value)| EnumValue {
            name: name.to_string(),
            ordinal,
            value,
        })
        .ok_or_else(|| ConversionFailure::NotMember {
            enumeration: def.name.clone(),
            text: raw.to_string(),
        })
}

pub fn convert_object(
    ty: &ObjectType,
    raw: &str,
    objects: &ObjectCatalog,
) -> Result<Value, ConversionFailure> {
    objects
        .find(ty, raw)
        .map(|entry| Value::Object(entry.to_ref()))
        .ok_or_else(|| ConversionFailure::NoSuchObject {
            ty: ty.name().to_string(),
            text: raw.to_string(),
        })
}

fn convert_text(raw: &str) -> Result<Value, ConversionFailure> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConversionFailure::Empty);
    }
    Ok(Value::Text(trimmed.to_string()))
}

fn parse<T: FromStr>(kind: ScalarKind, raw: &str) -> Result<T, ConversionFailure> {
    raw.trim().parse::<T>().map_err(|_| ConversionFailure::Parse {
        ty: kind.name(),
        text: raw.to_string(),
    })
}

/// Scalars go through the type's own `FromStr`; its error is dropped.
pub fn convert_scalar(kind: ScalarKind, raw: &str) -> Result<Value, ConversionFailure> {
    let value = match kind {
        ScalarKind::I8 => Value::Int(parse::<i8>(kind, raw)?.into()),
        ScalarKind::I16 => Value::Int(parse::<i16>(kind, raw)?.into()),
        ScalarKind::I32 => Value::Int(parse::<i32>(kind, raw)?.into()),
        ScalarKind::I64 => Value::Int(parse::<i64>(kind, raw)?),
        ScalarKind::U8 => Value::UInt(parse::<u8>(kind, raw)?.into()),
        ScalarKind::U16 => Value::UInt(parse::<u16>(kind, raw)?.into()),
        ScalarKind::U32 => Value::UInt(parse::<u32>(kind, raw)?.into()),
        ScalarKind::U64 => Value::UInt(parse::<u64>(kind, raw)?),
        ScalarKind::F32 => Value::Float(parse::<f32>(kind, raw)?.into()),
        ScalarKind::F64 => Value::Float(parse::<f64>(kind, raw)?),
        ScalarKind::Char => Value::Char(parse::<char>(kind, raw)?),
    };
    Ok(value)
}

/// Split on single spaces; every component must parse as `f32` and the
/// component count must equal the arity.
pub fn convert_vector(arity: usize, raw: &str) -> Result<Value, ConversionFailure> {
    let parts: Vec<&str> = raw.trim().split(' ').collect();
    if parts.len() != arity {
        return Err(ConversionFailure::Arity {
            expected: arity,
            found: parts.len(),
        });
    }
    let components = parts
        .iter()
        .map(|p| parse::<f32>(ScalarKind::F32, p))
        .collect::<Result<Vec<f32>, _>>()?;
    match components.as_slice() {
        [x, y] => Ok(Value::Vec2([*x, *y])),
        [x, y, z] => Ok(Value::Vec3([*x, *y, *z])),
        [x, y, z, w] => Ok(Value::Vec4([*x, *y, *z, *w])),
        _ => Err(ConversionFailure::Unsupported(format!("vec{arity}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::objects::NamedObject;

    #[test]
    fn booleans_ignore_case() {
        for text in ["true", "TRUE", "True"] {
            assert_eq!(convert_bool(text), Ok(true));
        }
        assert_eq!(convert_bool("fAlSe"), Ok(false));
        assert!(convert_bool("yes").is_err());
        assert!(convert_bool("1").is_err());
    }

    #[test]
    fn enum_members_carry_ordinal_and_value() {
        let def = EnumDef::with_values("Quality", [("Low", 10), ("High", 20)]);
        let v = convert_enum(&def, "high").unwrap();
        assert_eq!(v.name, "High");
        assert_eq!(v.ordinal, 1);
        assert_eq!(v.value, 20);
        assert!(convert_enum(&def, "Medium").is_err());
    }

    #[test]
    fn objects_must_be_assignable() {
        let catalog = ObjectCatalog::new()
            .with(NamedObject::new("Sword", Arc::new(()), ["Weapon", "Item"]));
        let item = ParamType::object("Item");
        let armor = ParamType::object("Armor");
        assert!(matches!(convert(&item, "sword", &catalog), Ok(Value::Object(o)) if o.name == "Sword"));
        assert!(convert(&armor, "sword", &catalog).is_err());
    }

    #[test]
    fn scalars_use_from_str() {
        let none = ObjectCatalog::new();
        assert_eq!(convert(&ParamType::INT, "-12", &none), Ok(Value::Int(-12)));
        assert_eq!(convert(&ParamType::FLOAT, "0.5", &none), Ok(Value::Float(0.5)));
        assert_eq!(
            convert(&ParamType::Scalar(ScalarKind::U8), "255", &none),
            Ok(Value::UInt(255))
        );
        assert!(convert(&ParamType::Scalar(ScalarKind::U8), "256", &none).is_err());
        assert!(convert(&ParamType::INT, "1.5", &none).is_err());
        assert_eq!(
            convert(&ParamType::Scalar(ScalarKind::Char), "x", &none),
            Ok(Value::Char('x'))
        );
    }

    #[test]
    fn vectors_need_exact_arity() {
        assert_eq!(convert_vector(3, "1 2 3"), Ok(Value::Vec3([1.0, 2.0, 3.0])));
        assert_eq!(
            convert_vector(3, "1 2"),
            Err(ConversionFailure::Arity {
                expected: 3,
                found: 2
            })
        );
        assert!(convert_vector(2, "1  2").is_err());
        assert!(convert_vector(2, "1 x").is_err());
        assert_eq!(convert_vector(4, "0 0 0 1"), Ok(Value::Vec4([0.0, 0.0, 0.0, 1.0])));
    }

    #[test]
    fn text_and_unsupported() {
        let none = ObjectCatalog::new();
        assert_eq!(convert(&ParamType::Text, " hi ", &none), Ok(Value::Text("hi".into())));
        assert_eq!(convert(&ParamType::Text, "  ", &none), Err(ConversionFailure::Empty));
        assert!(convert(&ParamType::Unsupported("Matrix".into()), "1", &none).is_err());
    }
}
