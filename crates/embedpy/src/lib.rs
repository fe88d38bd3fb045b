//! Embedding bridge between a native host and an embedded Python interpreter
//!
//! The bridge covers four concerns, each building on the previous one:
//! 1. Runtime lifecycle: start and query the process-wide interpreter
//! 2. Lock discipline: scoped, reentrant acquisition of the interpreter lock
//! 3. Object access: imports, attributes, classes and text values
//! 4. Invocation: argument tuples, constructor calls and method calls
//!
//! `ClassInstance` packages the common "load a class once, call it from many
//! threads" pattern on top of those.
//!
//! ```no_run
//! use embedpy::{BridgeError, Runtime};
//!
//! let runtime = Runtime::initialize()?;
//! let shouted = runtime.with_lock(|lock| {
//!     let module = lock.import_module("string")?;
//!     let capwords = lock.get_attribute(&module, "capwords")?;
//!     let mut args = lock.new_argument_tuple(1);
//!     args.set_argument(0, lock.new_text("hello bridge"))?;
//!     let result = lock.call(&capwords, args)?;
//!     let text = lock.decode_text(&result)?.to_owned_string();
//!     Ok::<String, BridgeError>(text)
//! })?;
//! assert_eq!(shouted, "Hello Bridge");
//! # Ok::<(), BridgeError>(())
//! ```

pub mod errors;
mod instance;
mod invocation;
mod lock;
mod object;
mod runtime;

pub use errors::BridgeError;
pub use instance::{ClassInstance, MethodOutput};
pub use invocation::ArgumentTuple;
pub use lock::LockToken;
pub use object::{DetachedObject, Object, TextView};
pub use runtime::Runtime;
