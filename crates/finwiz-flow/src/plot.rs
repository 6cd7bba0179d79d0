//! Flow diagrams as Mermaid text or a standalone HTML page

use crate::error::{FlowError, Result};
use crate::graph::Node;
use minijinja::{Environment, context};
use std::fmt;
use std::str::FromStr;

/// Default file written by `plot`
pub const DEFAULT_PLOT_FILE: &str = "finwiz_flow.html";

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ title }}</title>
  <script type="module">
    import mermaid from "https://cdn.jsdelivr.net/npm/mermaid@11/dist/mermaid.esm.min.mjs";
    mermaid.initialize({ startOnLoad: true });
  </script>
  <style>
    body { font-family: sans-serif; margin: 2rem; }
    li { margin: 0.2rem 0; }
  </style>
</head>
<body>
  <h1>{{ title }}</h1>
  <pre class="mermaid">
{{ diagram }}
  </pre>
  <h2>Stages</h2>
  <ol>
  {%- for node in nodes %}
    <li><code>{{ node.name }}</code>{% if node.after %} after {{ node.after | join(", ") }}{% endif %}</li>
  {%- endfor %}
  </ol>
</body>
</html>
"#;

/// Output format of a plot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlotFormat {
    Mermaid,
    #[default]
    Html,
}

impl fmt::Display for PlotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotFormat::Mermaid => f.write_str("mermaid"),
            PlotFormat::Html => f.write_str("html"),
        }
    }
}

impl FromStr for PlotFormat {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mermaid" | "mmd" => Ok(PlotFormat::Mermaid),
            "html" => Ok(PlotFormat::Html),
            other => Err(FlowError::Plot(format!("unknown plot format '{other}'"))),
        }
    }
}

/// Stages of a flow in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowGraph {
    pub name: String,
    pub nodes: Vec<Node>,
}

impl FlowGraph {
    pub fn new(name: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            nodes,
        }
    }

    /// Mermaid `flowchart` source
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("flowchart TD\n");
        for node in &self.nodes {
            out.push_str(&format!("    {}[\"{}\"]\n", node.name, node.name));
        }
        for node in &self.nodes {
            for dependency in &node.after {
                out.push_str(&format!("    {dependency} --> {}\n", node.name));
            }
        }
        out
    }

    pub fn to_html(&self) -> Result<String> {
        let nodes: Vec<_> = self
            .nodes
            .iter()
            .map(|n| context! { name => &n.name, after => &n.after })
            .collect();
        let env = Environment::new();
        env.render_str(
            HTML_TEMPLATE,
            context! {
                title => format!("{} flow", self.name),
                diagram => self.to_mermaid(),
                nodes => nodes,
            },
        )
        .map_err(|e| FlowError::Plot(e.to_string()))
    }

    pub fn render(&self, format: PlotFormat) -> Result<String> {
        match format {
            PlotFormat::Mermaid => Ok(self.to_mermaid()),
            PlotFormat::Html => self.to_html(),
        }
    }
}
