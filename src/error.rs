use thiserror::Error;

use crate::program::Ip;

/// Failures surfaced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The program source does not fit in the program store.
    #[error("program of {len} bytes exceeds capacity of {capacity} bytes")]
    CapacityExceeded { len: usize, capacity: usize },

    /// A bracket scan left the loaded program without finding its match.
    #[error("unbalanced bracket at instruction {at}")]
    UnbalancedBracket { at: Ip },

    /// A program was already loaded into this engine.
    #[error("a program is already loaded")]
    AlreadyLoaded,

    /// Failure reported by the I/O adapter.
    #[error("i/o adapter failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
