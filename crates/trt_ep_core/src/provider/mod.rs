//! Provider factory and instance contracts.
//!
//! # Responsibility
//! - Turn a configuration snapshot into backend provider instances.
//!
//! # Invariants
//! - Every `create_provider` call returns a separately owned instance.

pub mod execution_provider;
pub mod factory;
