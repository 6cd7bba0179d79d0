//! Stage orchestration for FinWiz
//!
//! A [`Flow`] runs named stages in dependency order. Every stage is an
//! [`Agent`](finwiz_core::Agent), usually a crew, whose result is stored
//! in [`FlowState`] and checkpointed to a file. A rerun loads checkpoints
//! instead of running those stages again, unless the flow is `fresh`.
//!
//! [`finwiz::build`] wires the stock, ETF, crypto and report crews into the
//! FinWiz pipeline; [`finwiz::graph`] describes it for plotting.

pub mod cache;
pub mod config;
pub mod error;
pub mod finwiz;
pub mod flow;
pub mod graph;
pub mod plot;
pub mod state;

pub use cache::StageCache;
pub use config::{FlowConfig, FlowConfigBuilder};
pub use error::{FlowError, Result};
pub use flow::{Flow, FlowBuilder, Stage};
pub use graph::Node;
pub use plot::{DEFAULT_PLOT_FILE, FlowGraph, PlotFormat};
pub use state::FlowState;
