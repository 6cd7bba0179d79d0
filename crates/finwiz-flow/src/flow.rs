//! Flow definition and execution

use crate::cache::StageCache;
use crate::config::FlowConfig;
use crate::error::{FlowError, Result};
use crate::graph::{self, Node};
use crate::plot::FlowGraph;
use crate::state::FlowState;
use async_trait::async_trait;
use finwiz_core::{Agent, Context, FlowInputs};
use std::sync::Arc;
use tracing::{error, info};

/// One node of a flow: an agent, the state key its result lands in, and
/// optionally a cache file that lets a later run skip it
#[derive(Clone)]
pub struct Stage {
    name: String,
    agent: Arc<dyn Agent>,
    state_key: String,
    after: Vec<String>,
    cache_file: Option<String>,
}

impl Stage {
    pub fn new(name: impl Into<String>, agent: Arc<dyn Agent>, state_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent,
            state_key: state_key.into(),
            after: Vec::new(),
            cache_file: None,
        }
    }

    /// Run only once every named stage has finished
    pub fn after(mut self, stages: &[&str]) -> Self {
        self.after = stages.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn cache_file(mut self, file_name: impl Into<String>) -> Self {
        self.cache_file = Some(file_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    pub fn dependencies(&self) -> &[String] {
        &self.after
    }

    fn node(&self) -> Node {
        Node {
            name: self.name.clone(),
            after: self.after.clone(),
        }
    }
}

/// Stages run one at a time in dependency order.
///
/// Each stage sees the run's inputs plus the results of the stages it
/// runs after.
///
/// # Example
///
/// ```rust,ignore
/// let flow = Flow::builder("finwiz")
///     .stage(Stage::new("check_stock", stock_crew, "stock_result"))
///     .stage(Stage::new("report", report_crew, "report_result").after(&["check_stock"]))
///     .build()?;
///
/// let state = flow.kickoff(&FlowInputs::now()).await?;
/// ```
pub struct Flow {
    name: String,
    stages: Vec<Stage>,
    order: Vec<usize>,
    cache: StageCache,
}

impl Flow {
    pub fn builder(name: impl Into<String>) -> FlowBuilder {
        FlowBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stages in execution order
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.order.iter().map(|&i| &self.stages[i])
    }

    pub fn cache(&self) -> &StageCache {
        &self.cache
    }

    /// Graph of the stages for plotting
    pub fn graph(&self) -> FlowGraph {
        FlowGraph::new(&self.name, self.stages().map(Stage::node).collect())
    }

    /// Run every stage with inputs derived from one clock reading
    pub async fn kickoff(&self, inputs: &FlowInputs) -> Result<FlowState> {
        info!(flow = %self.name, timestamp = %inputs.timestamp, "Flow started");
        let state = self.run(&inputs.to_context()).await?;
        info!(flow = %self.name, "Flow completed");
        Ok(state)
    }

    /// Run every stage on top of `base`
    pub async fn run(&self, base: &Context) -> Result<FlowState> {
        let mut state = FlowState::default();

        for stage in self.stages() {
            if let Some(file_name) = stage.cache_file.as_deref() {
                if let Some(cached) = self.cache.load(file_name).await {
                    info!(stage = %stage.name, state_key = %stage.state_key, "Loaded cached results, skipping stage");
                    state.set(&stage.state_key, cached);
                    continue;
                }
            }

            let mut context = base.clone();
            let upstream: Vec<&str> = stage
                .after
                .iter()
                .filter_map(|name| self.stages.iter().find(|s| &s.name == name))
                .map(|s| s.state_key.as_str())
                .collect();
            state.apply_to(&mut context, &upstream);

            info!(stage = %stage.name, agent = %stage.agent.name(), "Stage started");
            let raw = stage
                .agent
                .process(String::new(), &mut context)
                .await
                .map_err(|source| {
                    error!(stage = %stage.name, error = %source, "Stage failed");
                    FlowError::Stage {
                        stage: stage.name.clone(),
                        source,
                    }
                })?;
            info!(stage = %stage.name, output_length = raw.len(), "Stage completed");

            if let Some(file_name) = stage.cache_file.as_deref() {
                self.cache.store(file_name, &raw).await?;
            }
            state.set(&stage.state_key, raw);
        }

        Ok(state)
    }
}

#[async_trait]
impl Agent for Flow {
    /// Runs the flow and returns the last stage's result
    async fn process(&self, _input: String, context: &mut Context) -> finwiz_core::Result<String> {
        let state = self.run(context).await?;
        let last = self
            .stages()
            .last()
            .and_then(|stage| state.get(stage.state_key()))
            .unwrap_or_default();
        Ok(last.to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`Flow`]
pub struct FlowBuilder {
    name: String,
    stages: Vec<Stage>,
    config: FlowConfig,
}

impl FlowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            config: FlowConfig::default(),
        }
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the stage graph and fix the execution order
    pub fn build(self) -> Result<Flow> {
        if self.stages.is_empty() {
            return Err(FlowError::Empty);
        }
        self.config.validate()?;

        let probe = FlowState::default();
        if let Some(stage) = self.stages.iter().find(|s| probe.get(&s.state_key).is_none()) {
            return Err(FlowError::Config(format!(
                "stage '{}' uses unknown state key '{}'",
                stage.name, stage.state_key
            )));
        }

        let nodes: Vec<Node> = self.stages.iter().map(Stage::node).collect();
        let order = graph::execution_order(&nodes)?;

        Ok(Flow {
            name: self.name,
            stages: self.stages,
            order,
            cache: StageCache::new(self.config.cache_dir, self.config.fresh),
        })
    }
}
