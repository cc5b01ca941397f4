//! # sovran-multimethod
//!
//! Thread-safe multiple dispatch on exact runtime type signatures.
//!
//! `sovran-multimethod` lets several implementations share one function name,
//! each bound to a distinct list of argument types. A call is routed to the
//! implementation whose registered signature matches the runtime types of the
//! arguments exactly. This is handy for visitor-style dispatch, command or RPC
//! routing tables, and plugin resolution where the set of types is open-ended.
//!
//! ## Key Features
//!
//! - **Exact matching**: Signatures are compared type for type with `TypeId`; no
//!   subtype or "closest match" resolution
//! - **Thread-safe**: Registries and tables can be shared and used from any thread
//! - **Explicit registries**: Create isolated registries, namespace them, or opt in
//!   to a single process-wide one
//! - **Typed closures**: A closure's parameter types are its signature
//! - **Typed errors**: Registration conflicts and dispatch misses are distinct errors
//!
//! The crate also carries a few small independent helpers: a scoped closer
//! ([`scope`]), a timer ([`timer`]) and map field utilities ([`fields`]).
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_multimethod::{DispatchRegistry, DispatchError};
//!
//! fn main() -> Result<(), DispatchError> {
//!     let registry = DispatchRegistry::new();
//!
//!     // Bind one implementation per argument type
//!     let show = registry.register_fn("show", |n: i32| format!("number {}", n))?;
//!     registry.register_fn("show", |s: String| format!("text {:?}", s))?;
//!     registry.register_fn("show", |a: i32, b: i32| format!("pair {} {}", a, b))?;
//!
//!     // Every dispatcher for "show" sees every implementation
//!     println!("{}", show.call((42,))?);
//!     println!("{}", show.call(("hi".to_string(),))?);
//!     println!("{}", show.call((1, 2))?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Declaring Signatures Up Front
//!
//! ```rust
//! use sovran_multimethod::{register_signature, signature, DispatchRegistry, DispatchError};
//!
//! fn main() -> Result<(), DispatchError> {
//!     let registry = DispatchRegistry::new();
//!
//!     let greet = register_signature(signature![&'static str])
//!         .doc("Greets someone by name")
//!         .register(&registry, "greet", |name: &'static str| format!("Hello, {}", name))?;
//!
//!     assert_eq!(greet.call(("Ivan",))?, "Hello, Ivan");
//!     assert_eq!(greet.doc()?.as_deref(), Some("Greets someone by name"));
//!     Ok(())
//! }
//! ```
//!
//! ### Error Handling
//!
//! ```rust
//! use sovran_multimethod::{DispatchRegistry, DispatchError};
//!
//! let registry = DispatchRegistry::new();
//! if let Err(e) = registry.register_fn("g", |_: i32| "A") {
//!     eprintln!("Failed to register: {}", e);
//!     return;
//! }
//!
//! // Same name, same signature
//! match registry.register_fn("g", |_: i32| "B") {
//!     Ok(_) => println!("Registered"),
//!     Err(DispatchError::RegistrationConflict { name, signature }) => {
//!         println!("{}{} is already taken", name, signature)
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//!
//! // Nothing registered for f64
//! match registry.dispatch::<&str, _>("g", (7.0,)) {
//!     Ok(value) => println!("Got {}", value),
//!     Err(DispatchError::DispatchMiss { signature, .. }) => println!("No match for {}", signature),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```

mod any_value;
mod args;
mod dispatcher;
mod error;
pub mod fields;
mod registrar;
mod registry;
pub mod scope;
mod signature;
mod table;
pub mod timer;

pub use args::{Args, IntoArgs};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, FieldError};
pub use registrar::{register_signature, IntoImplementation, Registrar};
pub use registry::{DispatchRegistry, ScopedRegistry};
pub use signature::{Signature, SignatureOf, TypeDescriptor};
pub use table::{DispatchTable, Implementation, Metadata};
