use std::any::Any;
use std::sync::{Arc, Weak};

/// Weak handle to a host object a command can be invoked on. The console
/// never keeps targets alive; a dropped object is simply skipped.
#[derive(Clone)]
pub struct TargetHandle {
    object: Weak<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl TargetHandle {
    pub fn new<T: Any + Send + Sync>(object: &Arc<T>) -> Self {
        let object: Arc<dyn Any + Send + Sync> = Arc::clone(object) as Arc<dyn Any + Send + Sync>;
        Self {
            object: Arc::downgrade(&object),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.object.strong_count() > 0
    }

    pub fn upgrade(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.object.upgrade()
    }

    /// Identity comparison: both handles point at the same allocation.
    pub fn same_as(&self, other: &TargetHandle) -> bool {
        Weak::ptr_eq(&self.object, &other.object)
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Debug for TargetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetHandle")
            .field("type_name", &self.type_name)
            .field("alive", &self.is_alive())
            .finish()
    }
}
