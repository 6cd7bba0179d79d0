//! Core abstractions for FinWiz
//!
//! This crate defines the traits and types shared by every other crate in the
//! workspace: the [`Agent`] trait implemented by crews and tool agents, the
//! [`Context`] passed between pipeline stages, and the dated [`FlowInputs`]
//! each run starts from.

pub mod agent;
pub mod context;
pub mod domain;
pub mod error;
pub mod inputs;

pub use agent::Agent;
pub use context::Context;
pub use domain::Domain;
pub use error::{Error, Result};
pub use inputs::FlowInputs;
