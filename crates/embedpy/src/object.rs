//! Interpreter objects and the operations that look them up
//!
//! `Object<'py>` is an owned reference: dropping it releases the reference,
//! and because it cannot outlive its lock scope that release always happens
//! under the lock. Operations take `&Object` when they only borrow.

use crate::errors::BridgeError;
use crate::lock::LockToken;
use crate::runtime::Runtime;
use pyo3::prelude::*;
use pyo3::types::{PyList, PyModule, PyString};
use std::borrow::Cow;
use std::ffi::CString;
use std::fmt;
use std::ops::Deref;
use std::path::Path;

/// Owned reference to a value inside the interpreter, valid for one lock scope
pub struct Object<'py> {
    inner: Bound<'py, PyAny>,
}

impl<'py> Object<'py> {
    pub(crate) fn from_bound(inner: Bound<'py, PyAny>) -> Self {
        Self { inner }
    }

    pub fn as_bound(&self) -> &Bound<'py, PyAny> {
        &self.inner
    }

    pub fn into_bound(self) -> Bound<'py, PyAny> {
        self.inner
    }

    /// A second owned reference to the same object
    pub fn clone_ref(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }

    /// Identity comparison (`a is b`)
    pub fn is(&self, other: &Object<'py>) -> bool {
        self.inner.as_ptr() == other.inner.as_ptr()
    }

    pub fn is_none(&self) -> bool {
        self.inner.is_none()
    }

    pub fn type_name(&self) -> String {
        self.inner
            .get_type()
            .name()
            .map(|name| name.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string())
    }

    /// Keep the reference alive beyond the current lock scope
    pub fn unbind(self) -> DetachedObject {
        DetachedObject {
            inner: Some(self.inner.unbind()),
        }
    }
}

impl fmt::Debug for Object<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Object").field(&self.type_name()).finish()
    }
}

/// Owned reference that is not tied to a lock scope.
///
/// It can be stored and sent between threads, but must be bound through a
/// `LockToken` before use. Dropping it re-enters the lock to release the
/// reference.
pub struct DetachedObject {
    // Only `None` while being dropped
    inner: Option<Py<PyAny>>,
}

impl DetachedObject {
    pub fn bind<'py>(&self, lock: &LockToken<'py>) -> Object<'py> {
        let py = lock.python();
        match self.inner {
            Some(ref obj) => Object::from_bound(obj.bind(py).clone()),
            None => Object::from_bound(py.None().into_bound(py)),
        }
    }

    /// A second owned reference, counted under the lock
    pub fn clone_ref(&self, lock: &LockToken<'_>) -> DetachedObject {
        DetachedObject {
            inner: self.inner.as_ref().map(|obj| obj.clone_ref(lock.python())),
        }
    }
}

impl Drop for DetachedObject {
    fn drop(&mut self) {
        let Some(obj) = self.inner.take() else {
            return;
        };
        match Runtime::get() {
            Ok(runtime) => runtime.with_lock(move |_| drop(obj)),
            // Unreachable in practice: a detached object implies a running
            // runtime. pyo3 defers the release to its next attach.
            Err(_) => drop(obj),
        }
    }
}

impl fmt::Debug for DetachedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetachedObject").finish_non_exhaustive()
    }
}

/// Read-only UTF-8 text decoded from a text object.
///
/// Borrows the source `Object`, so it cannot outlive it; copy out with
/// `to_owned_string` when the text must survive the object. Under the
/// stable ABI the interpreter's UTF-8 buffer is not exposed, so the view
/// holds its own copy of the bytes rather than pointing into the object.
#[derive(Debug)]
pub struct TextView<'a> {
    text: Cow<'a, str>,
}

impl TextView<'_> {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn to_owned_string(&self) -> String {
        self.text.clone().into_owned()
    }
}

impl Deref for TextView<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<'py> LockToken<'py> {
    /// Resolve a named attribute (class member, module-level name, method, ...)
    pub fn get_attribute(&self, object: &Object<'py>, name: &str) -> Result<Object<'py>, BridgeError> {
        object
            .as_bound()
            .getattr(name)
            .map(Object::from_bound)
            .map_err(|e| BridgeError::Resolution(name.to_string(), self.record(e)))
    }

    /// Import a module by dotted name, running its top-level code on first import.
    ///
    /// The module search path is used as-is.
    pub fn import_module(&self, name: &str) -> Result<Object<'py>, BridgeError> {
        tracing::debug!(module = name, "importing module");
        PyModule::import(self.python(), name)
            .map(|module| Object::from_bound(module.into_any()))
            .map_err(|e| BridgeError::Import(name.to_string(), self.record(e)))
    }

    /// Fetch a class (or any type object) defined in `module`
    pub fn get_class(&self, module: &Object<'py>, class_name: &str) -> Result<Object<'py>, BridgeError> {
        self.get_attribute(module, class_name)
    }

    /// Whether the object's type is `str` or a subclass of it
    pub fn is_text(&self, object: &Object<'py>) -> bool {
        object.as_bound().is_instance_of::<PyString>()
    }

    /// UTF-8 view of a text object.
    ///
    /// A non-text object is rejected as a precondition violation. The text is
    /// copied out of the interpreter while decoding (see `TextView`).
    pub fn decode_text<'a>(&self, object: &'a Object<'py>) -> Result<TextView<'a>, BridgeError> {
        let text = object.as_bound().cast::<PyString>().map_err(|_| {
            BridgeError::Precondition(format!(
                "decode_text called on a '{}' object",
                object.type_name()
            ))
        })?;
        let text = text
            .to_cow()
            .map_err(|e| BridgeError::Decode(self.record(e)))?;
        Ok(TextView { text })
    }

    /// New text object holding `value`
    pub fn new_text(&self, value: &str) -> Object<'py> {
        Object::from_bound(PyString::new(self.python(), value).into_any())
    }

    /// The `None` singleton
    pub fn none(&self) -> Object<'py> {
        Object::from_bound(self.python().None().into_bound(self.python()))
    }

    /// Append `dir` to `sys.path` unless it is already there.
    /// Returns whether the path was added.
    pub fn add_search_path(&self, dir: &Path) -> Result<bool, BridgeError> {
        let dir = dir.to_string_lossy();
        append_sys_path(self.python(), &dir)
            .map_err(|e| BridgeError::Python(format!("Failed to extend sys.path: {}", self.record(e))))
    }

    /// Register a venv site-packages directory (`site.addsitedir`), honoring `.pth` files
    pub(crate) fn add_site_dir(&self, dir: &Path) -> Result<(), BridgeError> {
        let site = self.import_module("site")?;
        site.as_bound()
            .call_method1("addsitedir", (dir.to_string_lossy().into_owned(),))
            .map_err(|e| BridgeError::Python(format!("Failed to add site directory: {}", self.record(e))))?;
        Ok(())
    }

    /// Compile `source` into a module registered in `sys.modules` under `name`
    pub fn define_module(&self, name: &str, source: &str) -> Result<Object<'py>, BridgeError> {
        let nul = |what: &str| BridgeError::Precondition(format!("module {} contains a NUL byte", what));
        let code = CString::new(source).map_err(|_| nul("source"))?;
        let file_name = CString::new(format!("{}.py", name)).map_err(|_| nul("name"))?;
        let module_name = CString::new(name).map_err(|_| nul("name"))?;

        PyModule::from_code(
            self.python(),
            code.as_c_str(),
            file_name.as_c_str(),
            module_name.as_c_str(),
        )
        .map(|module| Object::from_bound(module.into_any()))
        .map_err(|e| BridgeError::Import(name.to_string(), self.record(e)))
    }
}

fn append_sys_path(py: Python<'_>, dir: &str) -> PyResult<bool> {
    let sys = PyModule::import(py, "sys")?;
    let sys_path = sys.getattr("path")?.cast_into::<PyList>()?;
    if sys_path.contains(dir)? {
        return Ok(false);
    }
    sys_path.append(dir)?;
    Ok(true)
}
