//! Lock discipline
//!
//! Every crossing into the interpreter happens inside `Runtime::with_lock`.
//! The scope holds two things at once: the runtime's reentrant bridge mutex,
//! which keeps bridge scopes on different threads from ever overlapping, and
//! the interpreter's own global lock, attached through pyo3 so that thread
//! state is created (or saved and restored) transparently.

use crate::runtime::Runtime;
use pyo3::marker::Ungil;
use pyo3::prelude::*;
use pyo3::types::PyTracebackMethods;
use pyo3::PyErr;
use std::cell::{Cell, RefCell};

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    /// Report of the last failure, shared by every nested scope on this thread
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Tracks how deeply the current thread is nested in bridge scopes.
/// Decrements on drop, so unwinding out of a scope keeps the count right.
/// Leaving the outermost scope discards any unconsumed failure report.
struct DepthGuard {
    level: usize,
}

impl DepthGuard {
    fn enter() -> Self {
        let level = DEPTH.with(|d| {
            let level = d.get() + 1;
            d.set(level);
            level
        });
        Self { level }
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(self.level - 1));
        if self.level == 1 {
            LAST_ERROR.with(|e| *e.borrow_mut() = None);
        }
    }
}

/// Proof that the current thread holds the interpreter lock.
///
/// Only `Runtime::with_lock` creates one, and it cannot leave that scope:
/// the `'py` lifetime ties it (and every `Object<'py>` obtained through it)
/// to the acquisition. It is not `Send`.
pub struct LockToken<'py> {
    py: Python<'py>,
    depth: usize,
}

impl Runtime {
    /// Run `f` while holding exclusive execution rights over the interpreter.
    ///
    /// Blocks until no other thread is inside a bridge scope. Reentrant: a
    /// nested call on the same thread does not deadlock. The lock is released
    /// when `f` returns, including when it returns an error or panics.
    ///
    /// Must not be entered from a thread that is already attached to the
    /// interpreter outside the bridge, since that thread would wait for the
    /// bridge mutex while holding the interpreter lock.
    pub fn with_lock<F, R>(&self, f: F) -> R
    where
        F: for<'py> FnOnce(&LockToken<'py>) -> R,
    {
        let _exclusive = self.exclusive.lock();
        let depth = DepthGuard::enter();
        tracing::trace!(depth = depth.level, "bridge lock acquired");

        let result = Python::attach(|py| {
            let token = LockToken {
                py,
                depth: depth.level,
            };
            f(&token)
        });

        tracing::trace!(depth = depth.level, "bridge lock released");
        result
    }
}

impl<'py> LockToken<'py> {
    /// The pyo3 handle for this acquisition, for callers that need raw pyo3 APIs
    pub fn python(&self) -> Python<'py> {
        self.py
    }

    /// Nesting depth of this acquisition on the current thread (outermost is 1)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run GIL-free native work with the interpreter lock released.
    ///
    /// The thread state is saved before `f` runs and restored afterwards.
    /// The bridge mutex stays held, so other bridge scopes still wait; only
    /// interpreter threads outside the bridge get to run meanwhile.
    pub fn suspend<F, T>(&self, f: F) -> T
    where
        F: Ungil + FnOnce() -> T,
        T: Ungil,
    {
        self.py.detach(f)
    }

    /// Take the report of the last failed operation.
    ///
    /// The report survives nested scopes: a failure inside an inner
    /// `with_lock` is still visible to the enclosing one until consumed or
    /// until the outermost scope ends. Falls back to an exception still pending in the interpreter (for
    /// example one left behind by raw pyo3 calls). Returns `None` once
    /// everything has been consumed.
    pub fn consume_last_error(&self) -> Option<String> {
        LAST_ERROR
            .with(|e| e.borrow_mut().take())
            .or_else(|| PyErr::take(self.py).map(|err| describe(self.py, &err)))
    }

    /// Store the full report of `err` and return its one-line summary
    pub(crate) fn record(&self, err: PyErr) -> String {
        let summary = err.to_string();
        let report = describe(self.py, &err);
        LAST_ERROR.with(|e| *e.borrow_mut() = Some(report));
        summary
    }
}

/// `Type: message` followed by the formatted traceback when there is one
fn describe(py: Python<'_>, err: &PyErr) -> String {
    let mut report = err.to_string();
    if let Some(traceback) = err.traceback(py) {
        if let Ok(formatted) = traceback.format() {
            report.push('\n');
            report.push_str(formatted.trim_end());
        }
    }
    report
}
