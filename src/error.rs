use crate::signature::Signature;

/// Errors that can occur when registering or dispatching multimethods
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// An implementation is already bound to this signature under this name
    #[error("duplicate registration: {name}{signature} is already bound")]
    RegistrationConflict { name: String, signature: Signature },

    /// No implementation matches the runtime types of the call arguments
    #[error("no match: {name} has no implementation for {signature}")]
    DispatchMiss { name: String, signature: Signature },

    /// The implementation's parameters disagree with the declared signature
    #[error("invalid signature for {name}: declared {declared}, implementation takes {actual}")]
    InvalidSignature {
        name: String,
        declared: Signature,
        actual: Signature,
    },

    /// The name is already in use by implementations with another output type
    #[error("{name} returns {expected}, not {requested}")]
    OutputMismatch {
        name: String,
        expected: &'static str,
        requested: &'static str,
    },

    /// Nothing has been registered under this name
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// An implementation asked for an argument that isn't there or has another type
    #[error("argument {index}: expected {expected}, found {found}")]
    ArgumentMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// Failed to acquire a lock on the registry or one of its tables
    #[error("failed to acquire lock")]
    LockError,
}

/// Errors returned by the map field helpers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The requested field was not present
    #[error("field not found: {0}")]
    KeyNotFound(String),
}
