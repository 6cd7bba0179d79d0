//! Command-line interface for FinWiz

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use finwiz_core::{Agent, Domain, FlowInputs};
use finwiz_crews::CrewFactory;
use finwiz_flow::{DEFAULT_PLOT_FILE, PlotFormat, finwiz};
use finwiz_llm::RetryingProvider;
use finwiz_llm::providers::OpenAIProvider;
use finwiz_research::ResearchToolkit;
use finwiz_runtime::AgentRuntime;
use finwiz_utils::Settings;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "finwiz", version)]
#[command(about = "Investment research crews for stocks, ETFs and crypto", long_about = None)]
struct Cli {
    /// Directory with per-crew agents.yaml/tasks.yaml overriding the built-in ones
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: stock, ETF and crypto research, then the report
    Kickoff {
        /// Ignore cached stage results
        #[arg(long)]
        fresh: bool,

        /// Root for crew output; stage results go to <DIR>/report
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Render the pipeline graph
    Plot {
        #[arg(long, value_enum, default_value_t = PlotArg::Html)]
        format: PlotArg,

        /// Output file; mermaid goes to stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run a single crew and print its output
    RunCrew {
        #[arg(value_enum)]
        crew: CrewArg,
    },

    /// Refresh the knowledge collections with current market data
    UpdateKnowledge {
        /// Also drop entries older than this many days
        #[arg(long, value_name = "DAYS", value_parser = clap::value_parser!(u32).range(1..=36_500))]
        prune_days: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PlotArg {
    Mermaid,
    Html,
}

impl From<PlotArg> for PlotFormat {
    fn from(arg: PlotArg) -> Self {
        match arg {
            PlotArg::Mermaid => PlotFormat::Mermaid,
            PlotArg::Html => PlotFormat::Html,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CrewArg {
    Stock,
    Etf,
    Crypto,
    Report,
}

impl From<CrewArg> for Domain {
    fn from(arg: CrewArg) -> Self {
        match arg {
            CrewArg::Stock => Domain::Stock,
            CrewArg::Etf => Domain::Etf,
            CrewArg::Crypto => Domain::Crypto,
            CrewArg::Report => Domain::Report,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = finwiz_utils::load_env();
    let cli = Cli::parse();

    let mut settings = Settings::from_env().context("Failed to load settings")?;
    if let Some(log_file) = finwiz_utils::init_tracing(&settings.logging)? {
        info!(path = %log_file.display(), "Logging to file");
    }
    if let Some(path) = env_file {
        info!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Command::Kickoff { fresh, output_dir } => {
            if let Some(dir) = output_dir {
                settings.flow.cache_dir = dir.join("report");
                settings.research.output_root = dir;
            }
            settings.flow.fresh = fresh;

            let factory = crew_factory(&settings, cli.config_dir)?;
            let flow = finwiz::build(&factory, settings.flow.clone())?;

            info!(fresh, cache_dir = %settings.flow.cache_dir.display(), "Starting FinWiz analysis");
            match flow.kickoff(&FlowInputs::now()).await {
                Ok(state) => {
                    info!(
                        report_length = state.report_result.len(),
                        "FinWiz analysis completed successfully"
                    );
                    println!("{}", state.report_result);
                }
                Err(e) => {
                    error!(error = %e, "FinWiz analysis failed");
                    return Err(e.into());
                }
            }
        }

        Command::Plot { format, out } => {
            let format = PlotFormat::from(format);
            let rendered = finwiz::graph().render(format)?;
            let out = match (out, format) {
                (Some(path), _) => Some(path),
                (None, PlotFormat::Html) => Some(PathBuf::from(DEFAULT_PLOT_FILE)),
                (None, PlotFormat::Mermaid) => None,
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), %format, "Flow plot saved");
                    println!("Flow plot saved to {}", path.display());
                }
                None => print!("{rendered}"),
            }
        }

        Command::RunCrew { crew } => {
            let domain = Domain::from(crew);
            let factory = crew_factory(&settings, cli.config_dir)?;
            let crew = factory.build(domain)?;

            let mut context = FlowInputs::now().to_context();
            if domain == Domain::Report {
                load_cached_results(&settings, &mut context);
            }

            info!(crew = %domain, "Running crew");
            let output = crew
                .process(String::new(), &mut context)
                .await
                .with_context(|| format!("Crew '{domain}' failed"))?;
            println!("{output}");
        }

        Command::UpdateKnowledge { prune_days } => {
            let toolkit = ResearchToolkit::new(settings.research.clone())?;
            for report in toolkit.update_knowledge().await {
                println!(
                    "{}: updated {}, failed {}",
                    report.collection,
                    report.updated.len(),
                    report.failed.len()
                );
                for (ticker, reason) in &report.failed {
                    println!("  {ticker}: {reason}");
                }
            }

            if let Some(days) = prune_days {
                let max_age = chrono::Duration::days(i64::from(days));
                for domain in Domain::ALL {
                    let removed = toolkit
                        .knowledge()
                        .prune(&domain.collection(), max_age)
                        .await?;
                    println!("{}: pruned {removed}", domain.collection());
                }
            }
        }
    }

    Ok(())
}

fn crew_factory(settings: &Settings, config_dir: Option<PathBuf>) -> anyhow::Result<CrewFactory> {
    let openai = settings.require_openai()?.clone();
    let provider = RetryingProvider::new(OpenAIProvider::with_config(openai)?, settings.retry.clone());
    let runtime = AgentRuntime::builder()
        .provider(Arc::new(provider))
        .default_model(settings.model.clone())
        .build()?;
    let toolkit = ResearchToolkit::new(settings.research.clone())?;

    let mut factory = CrewFactory::new(Arc::new(runtime), toolkit);
    if let Some(dir) = config_dir {
        factory = factory.with_config_root(dir);
    }
    Ok(factory)
}

/// Seed the report crew with earlier stage results from the cache directory
fn load_cached_results(settings: &Settings, context: &mut finwiz_core::Context) {
    for stage in finwiz::STAGES.iter().filter(|s| s.domain != Domain::Report) {
        let path = settings.flow.cache_dir.join(stage.cache_file);
        match std::fs::read_to_string(&path) {
            Ok(raw) => context.insert(stage.state_key, raw.into()),
            Err(e) => warn!(path = %path.display(), error = %e, "No cached result for report input"),
        }
    }
}
