//! MiniJinja-backed prompt templates
//!
//! [`JinjaTemplate`] renders any template string against serializable
//! variables. [`AgentPrompt`] and [`TaskPrompt`] are the two prompts every
//! crew member sees: the system prompt built from its role, and the user
//! prompt built from the task at hand.

use crate::{PromptError, Result};
use minijinja::Environment;
use serde::Serialize;

/// System prompt for a crew agent
pub const AGENT_SYSTEM_TEMPLATE: &str = r#"You are {{ role }}.{% if backstory %} {{ backstory }}{% endif %}
Your personal goal is: {{ goal }}
{%- if tools %}

You have access to the following tools: {{ tools | join(", ") }}.
A tool result starting with "Error:" describes a failure. Adjust the input or continue without that data.
{%- endif %}
{%- if full_date %}

Today is {{ full_date }}.
{%- endif %}"#;

/// User prompt for a single task
pub const TASK_TEMPLATE: &str = r"Current Task: {{ description }}

This is the expected criteria for your final answer: {{ expected_output }}
You MUST return the actual complete content as the final answer, not a summary.
{%- if context %}

This is the context you're working with:
{%- for item in context %}

### {{ item.name }}
{{ item.output }}
{%- endfor %}
{%- endif %}

Begin! Use the tools available and give your best final answer.";

/// A named template rendered with MiniJinja
#[derive(Debug, Clone)]
pub struct JinjaTemplate {
    name: String,
    source: String,
}

impl JinjaTemplate {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against any serializable value
    pub fn render<S: Serialize>(&self, vars: &S) -> Result<String> {
        let env = Environment::new();
        let value = minijinja::value::Value::from_serialize(vars);

        env.render_str(&self.source, value)
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }
}

/// Variables of [`AGENT_SYSTEM_TEMPLATE`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentPrompt {
    pub role: String,
    pub goal: String,
    pub backstory: Option<String>,
    pub tools: Vec<String>,
    pub full_date: Option<String>,
}

impl AgentPrompt {
    pub fn render(&self) -> Result<String> {
        JinjaTemplate::new("agent_system", AGENT_SYSTEM_TEMPLATE).render(self)
    }
}

/// Output of an earlier task shown to a later one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextBlock {
    pub name: String,
    pub output: String,
}

/// Variables of [`TASK_TEMPLATE`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPrompt {
    pub description: String,
    pub expected_output: String,
    pub context: Vec<ContextBlock>,
}

impl TaskPrompt {
    pub fn render(&self) -> Result<String> {
        JinjaTemplate::new("task", TASK_TEMPLATE).render(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jinja_template_renders() {
        let template = JinjaTemplate::new("greeting", "Allocate {{ amount }} {{ currency }}");
        let out = template
            .render(&json!({ "amount": 1000, "currency": "CHF" }))
            .unwrap();
        assert_eq!(out, "Allocate 1000 CHF");
    }

    #[test]
    fn test_jinja_syntax_error() {
        let template = JinjaTemplate::new("broken", "{% if %}");
        let err = template.render(&json!({})).unwrap_err();
        assert!(matches!(err, PromptError::RenderError { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_agent_prompt_with_tools() {
        let prompt = AgentPrompt {
            role: "Risk Assessor".to_string(),
            goal: "Quantify downside".to_string(),
            backstory: Some("Ex-regulator.".to_string()),
            tools: vec!["kraken_ticker".to_string(), "web_search".to_string()],
            full_date: Some("June 01, 2025".to_string()),
        }
        .render()
        .unwrap();

        assert!(prompt.starts_with("You are Risk Assessor. Ex-regulator."));
        assert!(prompt.contains("Your personal goal is: Quantify downside"));
        assert!(prompt.contains("kraken_ticker, web_search"));
        assert!(prompt.ends_with("Today is June 01, 2025."));
    }

    #[test]
    fn test_agent_prompt_minimal() {
        let prompt = AgentPrompt {
            role: "Analyst".to_string(),
            goal: "Analyse".to_string(),
            ..AgentPrompt::default()
        }
        .render()
        .unwrap();

        assert_eq!(prompt, "You are Analyst.\nYour personal goal is: Analyse");
    }

    #[test]
    fn test_task_prompt_includes_context() {
        let prompt = TaskPrompt {
            description: "Assess risk".to_string(),
            expected_output: "A risk table".to_string(),
            context: vec![ContextBlock {
                name: "market_analysis_task".to_string(),
                output: "NVDA, AMD".to_string(),
            }],
        }
        .render()
        .unwrap();

        assert!(prompt.starts_with("Current Task: Assess risk"));
        assert!(prompt.contains("expected criteria for your final answer: A risk table"));
        assert!(prompt.contains("### market_analysis_task\nNVDA, AMD"));
    }

    #[test]
    fn test_task_prompt_without_context() {
        let prompt = TaskPrompt {
            description: "Scan".to_string(),
            expected_output: "List".to_string(),
            context: Vec::new(),
        }
        .render()
        .unwrap();

        assert!(!prompt.contains("context you're working with"));
        assert!(prompt.ends_with("give your best final answer."));
    }
}
