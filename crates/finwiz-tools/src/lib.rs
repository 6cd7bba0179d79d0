//! Tool management and execution for FinWiz agents
//!
//! Tools are the only way crew agents touch the outside world: market data
//! APIs, web search, the knowledge store and the report directory. A failing
//! tool never aborts a crew; [`ToolRegistry::invoke`] turns the failure into
//! text the model can read and react to.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, render_output};
