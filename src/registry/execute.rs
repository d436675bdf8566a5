use std::any::Any;

use serde::Serialize;

use super::member::{CommandAction, Handler};
use super::{CommandDescriptor, CommandRegistry};
use crate::console::builtins::Builtin;
use crate::error::{ConsoleError, InvokeError};
use crate::model::{EnumValue, ObjectRef, Value};

/// Argument list handed to a command handler: one value per declared
/// parameter, defaults already filled in.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn value(&self, index: usize) -> Result<&'a Value, InvokeError> {
        self.values
            .get(index)
            .ok_or(InvokeError::MissingArgument { index })
    }

    fn typed<T>(
        &self,
        index: usize,
        expected: &'static str,
        f: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, InvokeError> {
        f(self.value(index)?).ok_or(InvokeError::WrongType { index, expected })
    }

    pub fn bool(&self, index: usize) -> Result<bool, InvokeError> {
        self.typed(index, "bool", Value::as_bool)
    }

    pub fn int(&self, index: usize) -> Result<i64, InvokeError> {
        self.typed(index, "integer", Value::as_int)
    }

    pub fn uint(&self, index: usize) -> Result<u64, InvokeError> {
        self.typed(index, "unsigned integer", Value::as_uint)
    }

    pub fn float(&self, index: usize) -> Result<f64, InvokeError> {
        self.typed(index, "float", Value::as_float)
    }

    pub fn text(&self, index: usize) -> Result<&'a str, InvokeError> {
        self.typed(index, "string", Value::as_text)
    }

    pub fn char(&self, index: usize) -> Result<char, InvokeError> {
        self.typed(index, "char", Value::as_char)
    }

    pub fn enumeration(&self, index: usize) -> Result<&'a EnumValue, InvokeError> {
        self.typed(index, "enum member", Value::as_enum)
    }

    pub fn object(&self, index: usize) -> Result<&'a ObjectRef, InvokeError> {
        self.typed(index, "named object", Value::as_object)
    }

    /// Borrow a named-object argument as its concrete host type.
    pub fn object_as<T: Any>(&self, index: usize) -> Result<&'a T, InvokeError> {
        self.object(index)?
            .downcast::<T>()
            .ok_or(InvokeError::WrongType {
                index,
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn vec2(&self, index: usize) -> Result<[f32; 2], InvokeError> {
        self.typed(index, "vec2", Value::as_vec2)
    }

    pub fn vec3(&self, index: usize) -> Result<[f32; 3], InvokeError> {
        self.typed(index, "vec3", Value::as_vec3)
    }

    pub fn vec4(&self, index: usize) -> Result<[f32; 4], InvokeError> {
        self.typed(index, "vec4", Value::as_vec4)
    }
}

/// Extend `resolved` with declared defaults for every trailing parameter.
/// Fails on the first trailing parameter without a default.
pub fn fill_defaults(
    descriptor: &CommandDescriptor,
    resolved: &[Value],
) -> Result<Vec<Value>, ConsoleError> {
    let mut values = resolved.to_vec();
    for param in descriptor.params.iter().skip(resolved.len()) {
        let default = param
            .default
            .clone()
            .ok_or_else(|| ConsoleError::MissingArgument {
                command: descriptor.display_name.clone(),
                parameter: param.name.clone(),
            })?;
        values.push(default);
    }
    Ok(values)
}

/// Outcome of running a host command against its targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub command: String,
    pub invoked: usize,
    pub skipped_dead: usize,
    pub failures: Vec<String>,
}

/// What `execute` did: either ran host handlers, or hands a console
/// built-in back to the caller with its filled argument list.
#[derive(Debug, Clone)]
pub enum Dispatch {
    Ran(ExecutionReport),
    Builtin(Builtin, Vec<Value>),
}

/// Execute the command at `index` with a resolved argument prefix.
/// Static commands run once; instance commands run once per live target.
pub fn execute(
    registry: &CommandRegistry,
    index: usize,
    resolved: &[Value],
) -> Result<Dispatch, ConsoleError> {
    let descriptor = registry
        .get(index)
        .ok_or_else(|| ConsoleError::UnknownCommand {
            name: format!("#{index}"),
        })?;
    let values = fill_defaults(descriptor, resolved)?;
    match &descriptor.action {
        CommandAction::Builtin(builtin) => Ok(Dispatch::Builtin(*builtin, values)),
        CommandAction::Handler(handler) => Ok(Dispatch::Ran(invoke(descriptor, handler, &values))),
    }
}

fn invoke(descriptor: &CommandDescriptor, handler: &Handler, values: &[Value]) -> ExecutionReport {
    let args = Args::new(values);
    let mut report = ExecutionReport {
        command: descriptor.display_name.clone(),
        ..ExecutionReport::default()
    };
    let record = |result: Result<(), InvokeError>, report: &mut ExecutionReport| {
        report.invoked += 1;
        if let Err(e) = result {
            tracing::warn!(command = %descriptor.display_name, error = %e, "command failed");
            report.failures.push(e.to_string());
        }
    };

    if descriptor.is_static() {
        record(handler(None, &args), &mut report);
        return report;
    }

    for target in descriptor.targets() {
        match target.upgrade() {
            Some(object) => record(handler(Some(object.as_ref()), &args), &mut report),
            None => {
                tracing::debug!(
                    command = %descriptor.display_name,
                    target = target.type_name(),
                    "skipping dead target"
                );
                report.skipped_dead += 1;
            }
        }
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::model::ParamType;
    use crate::registry::member::{instance_candidates, CommandHost, MemberTable, StaticTable};

    #[derive(Default)]
    struct Counter {
        total: Mutex<i64>,
    }

    impl CommandHost for Counter {
        fn declare_commands(table: &mut MemberTable<Self>) {
            table
                .method("Bump", |c, args| {
                    *c.total.lock() += args.int(0)?;
                    Ok(())
                })
                .param_with_default("by", ParamType::INT, Value::Int(1));
            table
                .method("Fail", |_, _| Err("nope".into()))
                .param("reason", ParamType::Text);
        }
    }

    fn registry_with(objects: &[Arc<Counter>]) -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register_static(Vec::new()).unwrap();
        registry.register_instance(objects.iter().flat_map(instance_candidates).collect());
        registry
    }

    #[test]
    fn runs_once_per_live_target_and_skips_dead_ones() {
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        let registry = registry_with(&[Arc::clone(&a), Arc::clone(&b)]);
        drop(b);

        let bump = registry.lookup_by_display_name("bump").unwrap();
        let Dispatch::Ran(report) = execute(&registry, bump, &[Value::Int(3)]).unwrap() else {
            panic!("expected a host command");
        };
        assert_eq!(report.invoked, 1);
        assert_eq!(report.skipped_dead, 1);
        assert!(report.failures.is_empty());
        assert_eq!(*a.total.lock(), 3);
    }

    #[test]
    fn defaults_fill_trailing_parameters() {
        let a = Arc::new(Counter::default());
        let registry = registry_with(&[Arc::clone(&a)]);
        let bump = registry.lookup_by_display_name("Bump").unwrap();
        execute(&registry, bump, &[]).unwrap();
        assert_eq!(*a.total.lock(), 1);
    }

    #[test]
    fn missing_argument_without_default_is_an_error() {
        let a = Arc::new(Counter::default());
        let registry = registry_with(&[Arc::clone(&a)]);
        let fail = registry.lookup_by_display_name("Fail").unwrap();
        let err = execute(&registry, fail, &[]).unwrap_err();
        assert_eq!(
            err,
            ConsoleError::MissingArgument {
                command: "Fail".into(),
                parameter: "reason".into()
            }
        );
    }

    #[test]
    fn handler_failures_are_reported_not_raised() {
        let a = Arc::new(Counter::default());
        let registry = registry_with(&[Arc::clone(&a)]);
        let fail = registry.lookup_by_display_name("Fail").unwrap();
        let Dispatch::Ran(report) =
            execute(&registry, fail, &[Value::Text("x".into())]).unwrap()
        else {
            panic!("expected a host command");
        };
        assert_eq!(report.invoked, 1);
        assert_eq!(report.skipped_dead, 0);
        assert_eq!(report.failures, vec!["nope".to_string()]);
    }

    #[test]
    fn static_commands_run_without_a_target() {
        let hits = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&hits);
        let mut table = StaticTable::new("tests");
        table.function("Ping", move |args| {
            assert!(args.is_empty());
            *seen.lock() += 1;
            Ok(())
        });
        let mut registry = CommandRegistry::new();
        registry.register_static(table.into_candidates()).unwrap();
        let ping = registry.lookup_by_display_name("ping").unwrap();
        execute(&registry, ping, &[]).unwrap();
        assert_eq!(*hits.lock(), 1);
    }
}
