pub mod param;
pub mod value;

// Re-export commonly used types at the model level.
pub use param::{EnumDef, ObjectType, ParamType, ParameterDescriptor, ScalarKind};
pub use value::{EnumValue, ObjectRef, Value};
