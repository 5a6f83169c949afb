//! Rule-based understanding of chat messages.
//!
//! Pipeline: Identifier Extraction → Intent Classification → Dialogue Responder

mod identifier;
mod intent;

pub use identifier::*;
pub use intent::*;
