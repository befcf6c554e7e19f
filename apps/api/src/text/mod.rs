//! Text preparation shared by every classifier: canonicalization, PII redaction
//! and the pattern helpers the vocabulary tables are built from.

pub mod canonical;
pub mod patterns;
pub mod redact;

pub use canonical::canonicalize;
pub use redact::{redact, redact_value};
