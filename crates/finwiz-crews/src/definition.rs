//! Embedded crew definitions and the agent handbook

use crate::error::Result;
use finwiz_core::Domain;
use finwiz_prompt::{CrewConfig, PromptError};
use std::path::Path;

/// Guidelines appended to every agent's backstory
pub const AGENT_HANDBOOK: &str = include_str!("../config/agent_handbook.md");

/// File name of the handbook inside an override directory
pub const HANDBOOK_FILE: &str = "agent_handbook.md";

/// `(agents.yaml, tasks.yaml)` compiled into the binary
pub fn embedded_yaml(domain: Domain) -> (&'static str, &'static str) {
    match domain {
        Domain::Stock => (
            include_str!("../config/stock/agents.yaml"),
            include_str!("../config/stock/tasks.yaml"),
        ),
        Domain::Etf => (
            include_str!("../config/etf/agents.yaml"),
            include_str!("../config/etf/tasks.yaml"),
        ),
        Domain::Crypto => (
            include_str!("../config/crypto/agents.yaml"),
            include_str!("../config/crypto/tasks.yaml"),
        ),
        Domain::Report => (
            include_str!("../config/report/agents.yaml"),
            include_str!("../config/report/tasks.yaml"),
        ),
    }
}

/// Load a crew's definitions with the handbook applied.
///
/// With `config_root`, `{config_root}/{domain}/agents.yaml` and `tasks.yaml`
/// replace the embedded files, and `{config_root}/agent_handbook.md`
/// replaces the embedded handbook when present.
pub fn load(domain: Domain, config_root: Option<&Path>) -> Result<CrewConfig> {
    let (mut config, handbook) = match config_root {
        Some(root) => {
            let config = CrewConfig::from_dir(root.join(domain.as_str()))?;
            let handbook_path = root.join(HANDBOOK_FILE);
            let handbook = if handbook_path.is_file() {
                std::fs::read_to_string(&handbook_path).map_err(|e| PromptError::FileLoadError {
                    path: handbook_path.display().to_string(),
                    detail: e.to_string(),
                })?
            } else {
                AGENT_HANDBOOK.to_string()
            };
            (config, handbook)
        }
        None => {
            let (agents, tasks) = embedded_yaml(domain);
            (CrewConfig::from_yaml(agents, tasks)?, AGENT_HANDBOOK.to_string())
        }
    };

    config.inject_guidelines(&handbook);
    tracing::debug!(
        crew = %domain,
        agents = config.agents().len(),
        tasks = config.tasks().len(),
        overridden = config_root.is_some(),
        "Loaded crew definition"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<T>(items: &[finwiz_prompt::Named<T>]) -> Vec<&str> {
        items.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_embedded_crews_load() {
        for domain in Domain::ALL {
            let config = load(domain, None).unwrap();
            assert!(!config.tasks().is_empty(), "{domain} has no tasks");
            for agent in config.agents() {
                let backstory = agent.spec.backstory.as_deref().unwrap();
                assert!(backstory.ends_with(AGENT_HANDBOOK.trim()), "{}", agent.name);
            }
        }
    }

    #[test]
    fn test_crew_rosters() {
        let stock = load(Domain::Stock, None).unwrap();
        assert_eq!(
            names(stock.agents()),
            vec![
                "market_analyst",
                "technical_analyst",
                "risk_assessor",
                "investment_strategist",
                "research_director"
            ]
        );
        assert_eq!(
            names(stock.tasks()),
            vec![
                "market_analysis_task",
                "technical_evaluation_task",
                "risk_assessment_task",
                "investment_strategy_task",
                "research_synthesis_task"
            ]
        );

        let etf = load(Domain::Etf, None).unwrap();
        assert!(etf.agent("etf_specialist").is_some());
        assert!(etf.task("etf_evaluation_task").is_some());

        let crypto = load(Domain::Crypto, None).unwrap();
        assert_eq!(
            names(crypto.tasks()),
            vec![
                "technical_analysis_task",
                "risk_assessment_task",
                "investment_strategy_task",
                "final_report_task"
            ]
        );

        let report = load(Domain::Report, None).unwrap();
        assert_eq!(
            names(report.agents()),
            vec![
                "financial_integration_analyst",
                "portfolio_allocator",
                "risk_manager",
                "investment_reporter"
            ]
        );
        let integration = report.task("comprehensive_financial_integration_task").unwrap();
        assert!(integration.description.contains("{stock_result}"));
        assert!(
            report
                .agent("portfolio_allocator")
                .unwrap()
                .goal
                .contains("1000 CHF")
        );
    }

    #[test]
    fn test_override_directory() {
        let root = tempfile::tempdir().unwrap();
        let crew_dir = root.path().join("crypto");
        std::fs::create_dir_all(&crew_dir).unwrap();
        std::fs::write(
            crew_dir.join("agents.yaml"),
            "solo:\n  role: Analyst\n  goal: Look at {current_date}\n",
        )
        .unwrap();
        std::fs::write(
            crew_dir.join("tasks.yaml"),
            "only_task:\n  description: Do it\n  expected_output: Done\n  agent: solo\n",
        )
        .unwrap();
        std::fs::write(root.path().join(HANDBOOK_FILE), "Be brief.").unwrap();

        let config = load(Domain::Crypto, Some(root.path())).unwrap();
        assert_eq!(config.tasks().len(), 1);
        assert_eq!(config.agent("solo").unwrap().backstory.as_deref(), Some("Be brief."));
    }

    #[test]
    fn test_override_missing_files_fails() {
        let root = tempfile::tempdir().unwrap();
        assert!(load(Domain::Stock, Some(root.path())).is_err());
    }
}
