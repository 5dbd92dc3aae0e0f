//! Kernel registry contracts.
//!
//! This module defines the registry capability the backend writes its kernels
//! into, plus the init/teardown lifecycle around it. The registry is passed in
//! explicitly; nothing here reaches for process-global state.

pub mod kernel;
pub mod lifecycle;
