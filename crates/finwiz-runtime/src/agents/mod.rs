//! Concrete agent implementations

pub mod tool;

pub use tool::ToolAgent;
