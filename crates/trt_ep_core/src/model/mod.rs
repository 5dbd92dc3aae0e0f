//! Provider configuration model.
//!
//! # Responsibility
//! - Define the internal configuration value shared by translation and factories.
//!
//! # Invariants
//! - Configuration is copied by value into factories and never mutated there.

pub mod provider_info;
