//! Infrastructure layer: remote API access, parsers, persistence and notification delivery.

pub mod dto;
pub mod notifier;
pub mod parser;
pub mod repository;
pub mod source;
