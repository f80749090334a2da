use thiserror::Error;

/// Failures raised while building or solving an instance.
#[derive(Debug, Error)]
pub enum Error {
    /// Binary word operator applied to operands of different widths.
    #[error("word width mismatch: {left} vs {right}")]
    SizeMismatch { left: usize, right: usize },

    /// Shift amount given as a symbolic word instead of a fixed integer.
    #[error("shift by a symbolic word is not supported")]
    UnsupportedVariableShift,

    /// Attempted to append a clause with no literals.
    #[error("clause must contain at least one literal")]
    EmptyClause,

    /// A word was used with an instance other than the one it was built in.
    #[error("word belongs to a different instance")]
    ForeignWord,

    /// The engine proved the instance has no model. Terminal for the
    /// instance; not a transport condition and never worth retrying.
    #[error("instance is unsatisfiable")]
    Unsatisfiable,

    /// The engine could not be invoked, crashed, or produced output matching
    /// neither accepted dialect. The only kind a caller might retry.
    #[error("solver failure: {0}")]
    SolverTransport(String),

    /// A model lookup before a successful solve.
    #[error("model not available before a successful solve")]
    ModelNotReady,
}

pub type Result<T> = std::result::Result<T, Error>;
