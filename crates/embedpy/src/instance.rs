//! Long-lived class instances
//!
//! A `ClassInstance` is created once (import, fetch class, instantiate) and
//! then driven from any number of host threads. Each method call takes the
//! lock for its own duration only.

use crate::errors::BridgeError;
use crate::lock::LockToken;
use crate::object::{DetachedObject, Object};
use crate::runtime::Runtime;
use embedpy_logger as logger;
use std::fmt;

/// What a method call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodOutput {
    /// The method returned text, copied out of the interpreter
    Text(String),
    /// The method returned something else; only its type name is kept
    Other(String),
}

impl fmt::Display for MethodOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodOutput::Text(text) => f.write_str(text),
            MethodOutput::Other(type_name) => write!(f, "<{} object>", type_name),
        }
    }
}

/// An instantiated class kept alive across lock scopes
pub struct ClassInstance {
    runtime: &'static Runtime,
    module: String,
    class: String,
    instance: DetachedObject,
}

impl ClassInstance {
    /// Import `module`, fetch `class` from it and construct it with no arguments
    pub fn load(runtime: &'static Runtime, module: &str, class: &str) -> Result<Self, BridgeError> {
        logger::debug(&format!("Loading {}.{}", module, class));

        let instance = runtime.with_lock(|lock| {
            let module_obj = lock.import_module(module)?;
            let class_obj = lock.get_class(&module_obj, class)?;
            let instance = lock.instantiate(&class_obj)?;
            logger::step(&format!("Instantiated {}", instance.type_name()));
            Ok::<DetachedObject, BridgeError>(instance.unbind())
        })?;

        Ok(Self {
            runtime,
            module: module.to_string(),
            class: class.to_string(),
            instance,
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Call `method` with text arguments.
    ///
    /// A text result is copied out before the result is released.
    pub fn invoke(&self, method: &str, args: &[&str]) -> Result<MethodOutput, BridgeError> {
        self.with_instance(|lock, instance| {
            let mut tuple = lock.new_argument_tuple(args.len());
            for (index, arg) in args.iter().enumerate() {
                tuple.set_argument(index, lock.new_text(arg))?;
            }

            let result = lock.call_method(instance, method, tuple)?;
            let output = if lock.is_text(&result) {
                MethodOutput::Text(lock.decode_text(&result)?.to_owned_string())
            } else {
                MethodOutput::Other(result.type_name())
            };

            logger::python(&format!("{}.{} returned {}", self.class, method, output));
            Ok::<MethodOutput, BridgeError>(output)
        })
    }

    /// Run `f` under the lock with the instance bound to that scope
    pub fn with_instance<F, R>(&self, f: F) -> R
    where
        F: for<'py> FnOnce(&LockToken<'py>, &Object<'py>) -> R,
    {
        self.runtime.with_lock(|lock| {
            let instance = self.instance.bind(lock);
            f(lock, &instance)
        })
    }

    /// Release this reference to the instance
    pub fn close(self) {
        logger::debug(&format!("Closing {}.{}", self.module, self.class));
    }
}

impl Clone for ClassInstance {
    /// Another handle to the same instance; the reference count is raised under the lock
    fn clone(&self) -> Self {
        let instance = self.runtime.with_lock(|lock| self.instance.clone_ref(lock));
        Self {
            runtime: self.runtime,
            module: self.module.clone(),
            class: self.class.clone(),
            instance,
        }
    }
}

impl fmt::Debug for ClassInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInstance")
            .field("module", &self.module)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER_SOURCE: &str = r#"
class Counter:
    def __init__(self):
        self.hits = 0

    def hit(self, label):
        self.hits += 1
        return f"{label}:{self.hits}"

    def total(self):
        return self.hits
"#;

    fn counter() -> ClassInstance {
        let runtime = Runtime::initialize().unwrap();
        runtime
            .with_lock(|lock| lock.define_module("embedpy_instance_counter", COUNTER_SOURCE).map(drop))
            .unwrap();
        ClassInstance::load(runtime, "embedpy_instance_counter", "Counter").unwrap()
    }

    #[test]
    fn test_invoke_returns_text() {
        let counter = counter();
        assert_eq!(
            counter.invoke("hit", &["a"]).unwrap(),
            MethodOutput::Text("a:1".to_string())
        );
        assert_eq!(
            counter.invoke("total", &[]).unwrap(),
            MethodOutput::Other("int".to_string())
        );
    }

    #[test]
    fn test_clone_shares_instance() {
        let counter = counter();
        let twin = counter.clone();
        twin.invoke("hit", &["x"]).unwrap();
        counter.close();
        assert_eq!(
            twin.invoke("hit", &["y"]).unwrap(),
            MethodOutput::Text("y:2".to_string())
        );
    }

    #[test]
    fn test_missing_method_is_resolution_error() {
        let counter = counter();
        let err = counter.invoke("nope", &[]).unwrap_err();
        assert!(matches!(err, BridgeError::Resolution(ref name, _) if name == "nope"));
    }

    #[test]
    fn test_output_display() {
        assert_eq!(MethodOutput::Text("hi".into()).to_string(), "hi");
        assert_eq!(MethodOutput::Other("int".into()).to_string(), "<int object>");
    }
}
