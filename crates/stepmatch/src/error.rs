//! Error types for the stepmatch library
//!
//! The driver wraps automaton errors and the I/O errors of dump persistence
//! in a single error type. Malformed dump *content* is never an error; see
//! [`crate::codec`].

use thiserror::Error;

/// Main error type for stepmatch operations
#[derive(Error, Debug)]
pub enum MatchError {
    /// Error from trie construction (e.g. an empty pattern)
    #[error(transparent)]
    Automaton(#[from] stepmatch_automaton::AutomatonError),

    /// I/O error while reading or writing a dump
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for stepmatch operations
pub type Result<T> = std::result::Result<T, MatchError>;

// Re-export component error type for users who need it
pub use stepmatch_automaton::AutomatonError;
