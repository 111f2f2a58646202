pub mod types;
pub mod prompt;
pub mod gemini;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use gemini::*;
pub use orchestrator::*;

use thiserror::Error;

/// Errors at the generation backend boundary.
///
/// These never propagate past the orchestrator: every variant is folded
/// into a textual `RoleOutput` so downstream stages proceed uniformly.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cannot reach the generation service at {0}")]
    Connection(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("generation service returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("malformed generation response: {0}")]
    ResponseParsing(String),
}
