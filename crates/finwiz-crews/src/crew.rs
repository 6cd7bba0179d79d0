//! Sequential crew execution

use crate::error::{CrewError, Result};
use async_trait::async_trait;
use finwiz_core::{Agent, Context, Domain};
use finwiz_prompt::{AgentPrompt, ContextBlock, CrewConfig, TaskPrompt};
use finwiz_runtime::AgentRuntime;
use finwiz_tools::ToolRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Output of one finished task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    pub task: String,
    pub agent: String,
    pub raw: String,
    /// Where the output was written, if the task declares an output file
    pub file: Option<PathBuf>,
}

/// Outputs of every task, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrewOutput {
    pub tasks: Vec<TaskOutput>,
}

impl CrewOutput {
    /// The final task's output
    pub fn raw(&self) -> &str {
        self.tasks.last().map_or("", |t| t.raw.as_str())
    }

    pub fn task(&self, name: &str) -> Option<&TaskOutput> {
        self.tasks.iter().find(|t| t.task == name)
    }
}

/// A group of agents working through an ordered task list.
///
/// Every task runs as a fresh tool agent built from its assigned agent's
/// definition. All agents of a crew share one tool registry.
pub struct Crew {
    name: String,
    domain: Domain,
    config: CrewConfig,
    runtime: Arc<AgentRuntime>,
    tools: Arc<ToolRegistry>,
    output_dir: PathBuf,
}

impl Crew {
    pub fn new(
        domain: Domain,
        config: CrewConfig,
        runtime: Arc<AgentRuntime>,
        tools: Arc<ToolRegistry>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: domain.as_str().to_string(),
            domain,
            config,
            runtime,
            tools,
            output_dir: output_dir.into(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn config(&self) -> &CrewConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Run every task in order.
    ///
    /// `{name}` placeholders are filled from the scalar entries of `context`.
    /// A non-blank `request` is shown to the first task as extra context.
    pub async fn kickoff(&self, request: &str, context: &Context) -> Result<CrewOutput> {
        if self.config.tasks().is_empty() {
            return Err(CrewError::NoTasks(self.name.clone()));
        }

        let mut config = self.config.clone();
        config.interpolate(&context.text_vars())?;

        let full_date = context
            .get_str(finwiz_core::context::keys::FULL_DATE)
            .map(str::to_string);
        let tool_names = self.tools.names();

        info!(crew = %self.name, tasks = config.tasks().len(), "Crew started");
        let mut output = CrewOutput::default();

        for (index, task) in config.tasks().iter().enumerate() {
            let spec = &task.spec;
            let Some(agent) = config.agent(&spec.agent) else {
                return Err(finwiz_prompt::PromptError::UnknownAgent {
                    task: task.name.clone(),
                    agent: spec.agent.clone(),
                }
                .into());
            };

            let system_prompt = AgentPrompt {
                role: agent.role.clone(),
                goal: agent.goal.clone(),
                backstory: agent.backstory.clone(),
                tools: tool_names.clone(),
                full_date: full_date.clone(),
            }
            .render()?;

            let mut blocks = Vec::new();
            if index == 0 && !request.trim().is_empty() {
                blocks.push(ContextBlock {
                    name: "request".to_string(),
                    output: request.to_string(),
                });
            }
            if spec.context.is_empty() {
                blocks.extend(output.tasks.last().map(|prev| ContextBlock {
                    name: prev.task.clone(),
                    output: prev.raw.clone(),
                }));
            } else {
                blocks.extend(spec.context.iter().filter_map(|name| {
                    output.task(name).map(|done| ContextBlock {
                        name: name.clone(),
                        output: done.raw.clone(),
                    })
                }));
            }

            let prompt = TaskPrompt {
                description: spec.description.clone(),
                expected_output: spec.expected_output.clone(),
                context: blocks,
            }
            .render()?;

            let mut executor_config = self.runtime.executor_config(system_prompt);
            if let Some(max_iter) = agent.max_iter {
                executor_config.max_iterations = max_iter;
            }
            let worker = self
                .runtime
                .create_tool_agent(executor_config, spec.agent.clone(), self.tools.clone());

            info!(crew = %self.name, task = %task.name, agent = %spec.agent, "Task started");
            let mut task_context = context.clone();
            let raw = worker
                .process(prompt, &mut task_context)
                .await
                .map_err(|source| {
                    error!(crew = %self.name, task = %task.name, error = %source, "Task failed");
                    CrewError::TaskFailed {
                        crew: self.name.clone(),
                        task: task.name.clone(),
                        source,
                    }
                })?;

            let file = match spec.output_file.as_deref() {
                Some(file_name) => Some(self.write_output(file_name, &raw).await?),
                None => None,
            };
            info!(
                crew = %self.name,
                task = %task.name,
                output_length = raw.len(),
                file = ?file,
                "Task finished"
            );

            output.tasks.push(TaskOutput {
                task: task.name.clone(),
                agent: spec.agent.clone(),
                raw,
                file,
            });
        }

        info!(crew = %self.name, "Crew finished");
        Ok(output)
    }

    async fn write_output(&self, file_name: &str, raw: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let content = if file_name.ends_with(".json") {
            strip_code_fence(raw)
        } else {
            raw
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CrewError::Output {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| CrewError::Output {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[async_trait]
impl Agent for Crew {
    async fn process(&self, input: String, context: &mut Context) -> finwiz_core::Result<String> {
        let output = self.kickoff(&input, context).await?;
        Ok(output.raw().to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Body of a fenced block like ```` ```json ... ``` ````, else the trimmed text
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}
