//! Application layer orchestrating domain logic and infrastructure.

pub mod dataset;
pub mod export;
pub mod selection;
pub mod session;
