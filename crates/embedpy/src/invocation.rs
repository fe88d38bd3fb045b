//! Positional-argument tuples and calls

use crate::errors::BridgeError;
use crate::lock::LockToken;
use crate::object::Object;
use pyo3::prelude::*;
use pyo3::types::PyTuple;

/// Fixed-size builder for the positional arguments of one call.
///
/// Every slot starts empty and may be filled exactly once; filling a slot
/// moves the object's reference into the tuple. The builder is consumed by
/// `LockToken::call`, which refuses to run while any slot is still empty.
pub struct ArgumentTuple<'py> {
    slots: Vec<Option<Bound<'py, PyAny>>>,
}

impl<'py> ArgumentTuple<'py> {
    fn with_size(size: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(size).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether every slot has been filled
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Place `object` at `index`, taking ownership of it.
    ///
    /// An index past the end or an already-filled slot is rejected; the
    /// rejected object is released.
    pub fn set_argument(&mut self, index: usize, object: Object<'py>) -> Result<(), BridgeError> {
        let size = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            BridgeError::Precondition(format!(
                "argument index {} out of range for a tuple of size {}",
                index, size
            ))
        })?;
        if slot.is_some() {
            return Err(BridgeError::Precondition(format!(
                "argument slot {} is already filled",
                index
            )));
        }
        *slot = Some(object.into_bound());
        Ok(())
    }

    fn into_tuple(self, py: Python<'py>) -> Result<Bound<'py, PyTuple>, BridgeError> {
        let items = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    BridgeError::Precondition(format!("argument slot {} was never filled", index))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PyTuple::new(py, items)?)
    }
}

impl<'py> LockToken<'py> {
    /// Empty argument tuple with `size` slots
    pub fn new_argument_tuple(&self, size: usize) -> ArgumentTuple<'py> {
        ArgumentTuple::with_size(size)
    }

    /// Construct an instance by calling `class` with no arguments
    pub fn instantiate(&self, class: &Object<'py>) -> Result<Object<'py>, BridgeError> {
        class
            .as_bound()
            .call0()
            .map(Object::from_bound)
            .map_err(|e| BridgeError::Invocation(callable_label(class), self.record(e)))
    }

    /// Call `callable` with the positional arguments in `args`.
    ///
    /// Fails before calling if a slot is empty. A target that is not callable,
    /// rejects the arity, or raises is reported as an invocation failure.
    pub fn call(&self, callable: &Object<'py>, args: ArgumentTuple<'py>) -> Result<Object<'py>, BridgeError> {
        let args = args.into_tuple(self.python())?;
        tracing::trace!(arity = args.len(), "calling into interpreter");
        callable
            .as_bound()
            .call1(args)
            .map(Object::from_bound)
            .map_err(|e| BridgeError::Invocation(callable_label(callable), self.record(e)))
    }

    /// `get_attribute(object, name)` followed by `call`
    pub fn call_method(
        &self,
        object: &Object<'py>,
        name: &str,
        args: ArgumentTuple<'py>,
    ) -> Result<Object<'py>, BridgeError> {
        let method = self.get_attribute(object, name)?;
        self.call(&method, args)
    }
}

/// Human-readable name for error messages: `__qualname__` when the object
/// has one (functions, methods, classes), its type name otherwise
fn callable_label(callable: &Object<'_>) -> String {
    callable
        .as_bound()
        .getattr("__qualname__")
        .map(|name| name.to_string())
        .unwrap_or_else(|_| callable.type_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn test_set_argument_bounds() {
        let runtime = Runtime::initialize().unwrap();
        runtime.with_lock(|lock| {
            let mut args = lock.new_argument_tuple(2);
            assert_eq!(args.len(), 2);
            assert!(!args.is_complete());

            args.set_argument(0, lock.new_text("a")).unwrap();
            let err = args.set_argument(2, lock.new_text("c")).unwrap_err();
            assert!(matches!(err, BridgeError::Precondition(_)));

            let err = args.set_argument(0, lock.new_text("again")).unwrap_err();
            assert!(err.to_string().contains("already filled"));

            args.set_argument(1, lock.new_text("b")).unwrap();
            assert!(args.is_complete());
        });
    }

    #[test]
    fn test_call_rejects_unfilled_slot() {
        let runtime = Runtime::initialize().unwrap();
        runtime.with_lock(|lock| {
            let builtins = lock.import_module("builtins").unwrap();
            let len = lock.get_attribute(&builtins, "len").unwrap();
            let err = lock.call(&len, lock.new_argument_tuple(1)).unwrap_err();
            assert!(matches!(err, BridgeError::Precondition(_)));
        });
    }

    #[test]
    fn test_call_builtin_with_text() {
        let runtime = Runtime::initialize().unwrap();
        runtime.with_lock(|lock| {
            let builtins = lock.import_module("builtins").unwrap();
            let len = lock.get_attribute(&builtins, "len").unwrap();
            let mut args = lock.new_argument_tuple(1);
            args.set_argument(0, lock.new_text("four")).unwrap();
            let result = lock.call(&len, args).unwrap();
            assert_eq!(result.as_bound().extract::<usize>().unwrap(), 4);
        });
    }

    #[test]
    fn test_calling_non_callable_fails() {
        let runtime = Runtime::initialize().unwrap();
        runtime.with_lock(|lock| {
            let text = lock.new_text("not callable");
            let err = lock.call(&text, lock.new_argument_tuple(0)).unwrap_err();
            assert!(matches!(err, BridgeError::Invocation(ref label, _) if label == "str"));
            assert!(lock.consume_last_error().unwrap().contains("TypeError"));
        });
    }
}
