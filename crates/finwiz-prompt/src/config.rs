//! Crew definitions loaded from YAML
//!
//! A crew is described by two files: `agents.yaml` maps agent names to a
//! role, goal and backstory, and `tasks.yaml` maps task names to a
//! description, expected output and the agent that performs it. Task order
//! in the file is execution order.
//!
//! ```
//! use finwiz_prompt::CrewConfig;
//!
//! let agents = r#"
//! analyst:
//!   role: Market Analyst
//!   goal: Find growth stocks for {current_year}
//! "#;
//! let tasks = r#"
//! scan:
//!   description: Scan the market
//!   expected_output: A shortlist
//!   agent: analyst
//! "#;
//!
//! let config = CrewConfig::from_yaml(agents, tasks)?;
//! assert_eq!(config.tasks().len(), 1);
//! assert_eq!(config.agent("analyst").map(|a| a.role.as_str()), Some("Market Analyst"));
//! # Ok::<(), finwiz_prompt::PromptError>(())
//! ```

use crate::interpolate::interpolate;
use crate::{PromptError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the agent definitions inside a crew config directory
pub const AGENTS_FILE: &str = "agents.yaml";
/// File name of the task definitions inside a crew config directory
pub const TASKS_FILE: &str = "tasks.yaml";

/// One agent of a crew
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    #[serde(default)]
    pub backstory: Option<String>,
    /// Per-agent override of the executor's iteration budget
    #[serde(default)]
    pub max_iter: Option<usize>,
}

/// One task of a crew
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub description: String,
    pub expected_output: String,
    pub agent: String,
    /// Names of earlier tasks whose outputs feed this one
    #[serde(default)]
    pub context: Vec<String>,
    /// Relative path the task output is written to
    #[serde(default)]
    pub output_file: Option<String>,
}

/// A named entry, preserving file order
#[derive(Debug, Clone, PartialEq)]
pub struct Named<T> {
    pub name: String,
    pub spec: T,
}

/// Agents and tasks of one crew
#[derive(Debug, Clone, PartialEq)]
pub struct CrewConfig {
    agents: Vec<Named<AgentSpec>>,
    tasks: Vec<Named<TaskSpec>>,
}

impl CrewConfig {
    /// Parse and validate agent and task YAML documents
    pub fn from_yaml(agents_yaml: &str, tasks_yaml: &str) -> Result<Self> {
        let agents = parse_named::<AgentSpec>(agents_yaml, AGENTS_FILE)?;
        let tasks = parse_named::<TaskSpec>(tasks_yaml, TASKS_FILE)?;
        let config = Self { agents, tasks };
        config.validate()?;
        Ok(config)
    }

    /// Load `agents.yaml` and `tasks.yaml` from a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let agents = read_config(&dir.join(AGENTS_FILE))?;
        let tasks = read_config(&dir.join(TASKS_FILE))?;
        tracing::debug!(dir = %dir.display(), "Loaded crew configuration from disk");
        Self::from_yaml(&agents, &tasks)
    }

    /// Every task names a defined agent, and context only points backwards.
    pub fn validate(&self) -> Result<()> {
        for (index, task) in self.tasks.iter().enumerate() {
            if self.agent(&task.spec.agent).is_none() {
                return Err(PromptError::UnknownAgent {
                    task: task.name.clone(),
                    agent: task.spec.agent.clone(),
                });
            }
            for context in &task.spec.context {
                let earlier = self.tasks[..index].iter().any(|t| &t.name == context);
                if !earlier {
                    return Err(PromptError::UnknownContextTask {
                        task: task.name.clone(),
                        context: context.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Append shared guidelines to every backstory, separated by a blank line
    ///
    /// An agent without a backstory takes the guidelines as its backstory.
    /// Blank guidelines leave the crew unchanged.
    pub fn inject_guidelines(&mut self, guidelines: &str) {
        let guidelines = guidelines.trim();
        if guidelines.is_empty() {
            return;
        }

        for agent in &mut self.agents {
            let backstory = match agent.spec.backstory.take() {
                Some(existing) if !existing.trim().is_empty() => {
                    format!("{}\n\n{guidelines}", existing.trim_end())
                }
                _ => guidelines.to_string(),
            };
            agent.spec.backstory = Some(backstory);
        }
        tracing::debug!(agents = self.agents.len(), "Injected agent guidelines");
    }

    /// Fill `{name}` placeholders across all agent and task text
    pub fn interpolate(&mut self, vars: &BTreeMap<String, String>) -> Result<()> {
        for agent in &mut self.agents {
            let spec = &mut agent.spec;
            spec.role = interpolate(&spec.role, vars)?;
            spec.goal = interpolate(&spec.goal, vars)?;
            if let Some(backstory) = spec.backstory.as_deref() {
                spec.backstory = Some(interpolate(backstory, vars)?);
            }
        }
        for task in &mut self.tasks {
            let spec = &mut task.spec;
            spec.description = interpolate(&spec.description, vars)?;
            spec.expected_output = interpolate(&spec.expected_output, vars)?;
            if let Some(path) = spec.output_file.as_deref() {
                spec.output_file = Some(interpolate(path, vars)?);
            }
        }
        Ok(())
    }

    /// Look up an agent by name
    pub fn agent(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.name == name).map(|a| &a.spec)
    }

    /// Look up a task by name
    pub fn task(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|t| t.name == name).map(|t| &t.spec)
    }

    /// Agents in file order
    pub fn agents(&self) -> &[Named<AgentSpec>] {
        &self.agents
    }

    /// Tasks in execution order
    pub fn tasks(&self) -> &[Named<TaskSpec>] {
        &self.tasks
    }
}

fn read_config(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PromptError::ConfigNotFound(path.display().to_string()));
    }
    std::fs::read_to_string(path).map_err(|e| PromptError::FileLoadError {
        path: path.display().to_string(),
        detail: e.to_string(),
    })
}

fn parse_named<T: DeserializeOwned>(text: &str, source_name: &str) -> Result<Vec<Named<T>>> {
    if text.trim().is_empty() {
        return Err(PromptError::EmptyConfig(source_name.to_string()));
    }

    let invalid = |detail: String| PromptError::InvalidYaml {
        source_name: source_name.to_string(),
        detail,
    };

    let document: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| invalid(e.to_string()))?;

    let mapping = match document {
        serde_yaml::Value::Mapping(mapping) => mapping,
        serde_yaml::Value::Null => return Err(PromptError::EmptyConfig(source_name.to_string())),
        _ => return Err(PromptError::NotAMapping(source_name.to_string())),
    };
    if mapping.is_empty() {
        return Err(PromptError::EmptyConfig(source_name.to_string()));
    }

    mapping
        .into_iter()
        .map(|(key, value)| {
            let name = key
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(format!("non-string key {key:?}")))?;
            let spec = serde_yaml::from_value(value).map_err(|e| invalid(format!("{name}: {e}")))?;
            Ok(Named { name, spec })
        })
        .collect()
}
