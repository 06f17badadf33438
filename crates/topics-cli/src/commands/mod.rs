//! Command implementations for topics-cli

pub mod chat;
pub mod generate;

pub use chat::chat;
pub use generate::generate;
