//! Read crew output directories for the report crew

use async_trait::async_trait;
use finwiz_core::Result as AgentResult;
use finwiz_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

const TEXT_EXTENSIONS: &[&str] = &["md", "html", "json", "txt", "csv"];

/// Sub-directories of the output root read when no directory is given
pub const DEFAULT_SUBDIRS: &[&str] = &["crypto", "etf", "stock"];

#[derive(Debug, Deserialize)]
struct DirectoryParams {
    #[serde(default)]
    directory: Option<String>,
}

/// Lists a directory and returns the content of its text files
pub struct DirectoryReadTool {
    output_root: PathBuf,
}

impl DirectoryReadTool {
    pub const NAME: &'static str = "directory_read";

    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    fn is_text(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }

    async fn read_dir(dir: &Path) -> std::io::Result<String> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();

        let mut out = format!("## {}\n\n", dir.display());
        if files.is_empty() {
            out.push_str("(no files)\n\n");
            return Ok(out);
        }
        for path in &files {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            if !Self::is_text(path) {
                out.push_str(&format!("### {name}\n(skipped: not a text file)\n\n"));
                continue;
            }
            match tokio::fs::read_to_string(path).await {
                Ok(content) => out.push_str(&format!("### {name}\n{}\n\n", content.trim_end())),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read file");
                    out.push_str(&format!("### {name}\n(unreadable: {e})\n\n"));
                }
            }
        }
        Ok(out)
    }

    /// Render every requested directory, noting missing ones
    pub async fn read_all(&self, directory: Option<&str>) -> String {
        let dirs: Vec<PathBuf> = match directory.map(str::trim).filter(|d| !d.is_empty()) {
            Some(dir) => vec![PathBuf::from(dir)],
            None => DEFAULT_SUBDIRS
                .iter()
                .map(|sub| self.output_root.join(sub))
                .collect(),
        };

        let mut out = String::new();
        for dir in dirs {
            if !dir.is_dir() {
                out.push_str(&format!("## {}\n\n(directory not found)\n\n", dir.display()));
                continue;
            }
            match Self::read_dir(&dir).await {
                Ok(section) => out.push_str(&section),
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Failed to list directory");
                    out.push_str(&format!("## {}\n\n(unreadable: {e})\n\n", dir.display()));
                }
            }
        }
        out.trim_end().to_string()
    }
}

#[async_trait]
impl Tool for DirectoryReadTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: DirectoryParams = super::parse_params(Self::NAME, params)?;
        Ok(json!(self.read_all(params.directory.as_deref()).await))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Read the reports written by the stock, ETF and crypto crews. Without a \
         directory, reads every crew output directory."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {"type": "string", "description": "Optional directory to read"}
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_default_crew_dirs() {
        let root = tempfile::tempdir().unwrap();
        let stock = root.path().join("stock");
        std::fs::create_dir_all(&stock).unwrap();
        std::fs::write(stock.join("b_report.md"), "# Stocks\nBuy AAPL\n").unwrap();
        std::fs::write(stock.join("a_data.json"), "{\"ok\":true}").unwrap();
        std::fs::write(stock.join("chart.png"), [0u8, 1, 2]).unwrap();

        let tool = DirectoryReadTool::new(root.path());
        let out = tool.execute(json!({})).await.unwrap();
        let text = out.as_str().unwrap();

        assert!(text.contains("crypto") && text.contains("(directory not found)"));
        let a = text.find("### a_data.json").unwrap();
        let b = text.find("### b_report.md\n# Stocks\nBuy AAPL").unwrap();
        assert!(a < b);
        assert!(text.contains("### chart.png\n(skipped: not a text file)"));
    }

    #[tokio::test]
    async fn test_explicit_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tool = DirectoryReadTool::new("unused");
        let out = tool.read_all(dir.path().to_str()).await;
        assert!(out.ends_with("(no files)"));
    }
}
