use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Selected member of an enumeration parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Declared member name, in its declared casing.
    pub name: String,
    /// Position of the member within its enumeration.
    pub ordinal: usize,
    /// Host-side discriminant for the member.
    pub value: i64,
}

/// A named object from the host's catalog, carried as a shared handle.
#[derive(Clone)]
pub struct ObjectRef {
    pub name: String,
    handle: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    pub fn new(name: impl Into<String>, handle: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    pub fn handle(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.handle
    }

    /// Borrow the referenced object as a concrete type.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A typed argument value. Closed over the parameter types the console can
/// convert, so dispatch on arguments is exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Enum(EnumValue),
    Object(ObjectRef),
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<[f32; 2]> {
        match self {
            Value::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec4(&self) -> Option<[f32; 4]> {
        match self {
            Value::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    /// Short type label, used in diagnostics.
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Enum(_) => "enum",
            Value::Object(_) => "object",
            Value::Text(_) => "string",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Vec2(_) => "vec2",
            Value::Vec3(_) => "vec3",
            Value::Vec4(_) => "vec4",
        }
    }
}

fn write_components(f: &mut fmt::Formatter<'_>, components: &[f32]) -> fmt::Result {
    for (i, c) in components.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{c}")?;
    }
    Ok(())
}

/// Display text is the console's textual form of a value: converting it back
/// through the argument converters yields an equal value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Enum(v) => f.write_str(&v.name),
            Value::Object(v) => f.write_str(&v.name),
            Value::Text(v) => f.write_str(v),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Vec2(v) => write_components(f, v),
            Value::Vec3(v) => write_components(f, v),
            Value::Vec4(v) => write_components(f, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_display_space_separated() {
        assert_eq!(Value::Vec3([1.0, 2.5, -3.0]).to_string(), "1 2.5 -3");
    }

    #[test]
    fn objects_compare_by_handle() {
        let sword: Arc<dyn Any + Send + Sync> = Arc::new(String::from("sword"));
        let a = ObjectRef::new("Sword", Arc::clone(&sword));
        let b = ObjectRef::new("sword", sword);
        let c = ObjectRef::new("Sword", Arc::new(String::from("sword")));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast::<String>().map(String::as_str), Some("sword"));
    }

    #[test]
    fn numeric_accessors_widen() {
        assert_eq!(Value::Int(4).as_float(), Some(4.0));
        assert_eq!(Value::UInt(7).as_int(), Some(7));
        assert_eq!(Value::Int(-1).as_uint(), None);
        assert_eq!(Value::Text("x".into()).as_int(), None);
    }
}
