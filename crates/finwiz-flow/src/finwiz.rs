//! The FinWiz pipeline: stock, ETF and crypto research feeding one report

use crate::config::FlowConfig;
use crate::error::Result;
use crate::flow::{Flow, Stage};
use crate::graph::Node;
use crate::plot::FlowGraph;
use finwiz_core::Domain;
use finwiz_core::context::keys;
use finwiz_crews::CrewFactory;
use std::sync::Arc;

pub const FLOW_NAME: &str = "finwiz";

/// Static description of one pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    pub name: &'static str,
    pub domain: Domain,
    pub after: &'static [&'static str],
    pub cache_file: &'static str,
    pub state_key: &'static str,
}

pub const STAGES: [StageSpec; 4] = [
    StageSpec {
        name: "check_stock",
        domain: Domain::Stock,
        after: &[],
        cache_file: "stock_unicorn_investment_recommendations.json",
        state_key: keys::STOCK_RESULT,
    },
    StageSpec {
        name: "check_etf",
        domain: Domain::Etf,
        after: &["check_stock"],
        cache_file: "etf_unicorn_investment_recommendations.json",
        state_key: keys::ETF_RESULT,
    },
    StageSpec {
        name: "check_crypto",
        domain: Domain::Crypto,
        after: &["check_etf"],
        cache_file: "crypto_unicorn_investment_recommendations.json",
        state_key: keys::CRYPTO_RESULT,
    },
    StageSpec {
        name: "report",
        domain: Domain::Report,
        after: &["check_stock", "check_etf", "check_crypto"],
        cache_file: "comprehensive_investment_report.json",
        state_key: keys::REPORT_RESULT,
    },
];

/// The pipeline graph, available without building any crew
pub fn graph() -> FlowGraph {
    FlowGraph::new(
        FLOW_NAME,
        STAGES.iter().map(|s| Node::new(s.name, s.after)).collect(),
    )
}

/// Build the full pipeline with one crew per stage
pub fn build(factory: &CrewFactory, config: FlowConfig) -> Result<Flow> {
    let mut builder = Flow::builder(FLOW_NAME).config(config);
    for stage in &STAGES {
        let crew = Arc::new(factory.build(stage.domain)?);
        builder = builder.stage(
            Stage::new(stage.name, crew, stage.state_key)
                .after(stage.after)
                .cache_file(stage.cache_file),
        );
    }
    builder.build()
}
