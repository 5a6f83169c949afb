//! Domain models for the pharmacy record manager.

mod chat;
mod patient;
mod scan;

pub use chat::*;
pub use patient::*;
pub use scan::*;
