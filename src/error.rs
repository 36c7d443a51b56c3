use thiserror::Error;

/// User-facing failures. All of these are recovered locally and shown on the
/// status line; none abort the process.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PosError {
    #[error("Maximum of {0} customers allowed. Complete a transaction to add more.")]
    MaxSessionsReached(usize),

    #[error("Cannot close this tab. Customer has items in their cart.")]
    SessionNotEmpty,

    #[error("Please add at least one product before proceeding to checkout.")]
    EmptyCart,

    #[error("Please select at least one product before proceeding to checkout.")]
    NoProductSelected,

    #[error("Stored session data is malformed")]
    MalformedPersistedState,

    #[error("No such customer: {0}")]
    UnknownSession(String),

    #[error("A staff member with this email already exists")]
    DuplicateEmail,
}
