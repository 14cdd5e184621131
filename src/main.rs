use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use surveylens::io::{
    execution_file_name, executions_file_name, write_execution_json, write_executions_json,
};
use surveylens::provider::execution_id_of;
use surveylens::{
    aggregate, format_call_log, load_records_file, render_conversation, write_summary_json,
    AnalyticsConfig, AnalyticsExport, AnalyticsSummary, ExecutionsClient, ProviderConfig,
    SummaryReport,
};

#[derive(Parser)]
#[command(name = "surveylens")]
#[command(author, version, about = "NPS survey analytics for voice-agent call logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute survey analytics from a saved executions file
    Analyze {
        /// Input executions file (provider JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the analytics summary (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the text report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Directory to write a dated analytics export into
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Agent id recorded in the export
        #[arg(long, default_value = "local")]
        agent_id: String,

        /// Do not count bare topic mentions as neutral feedback
        #[arg(long)]
        ignore_bare_mentions: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Fetch executions from the calling provider and analyze them
    Fetch {
        /// Agent whose executions are fetched (defaults to CALL_PROVIDER_AGENT_ID)
        #[arg(long)]
        agent_id: Option<String>,

        /// Output file for the raw executions (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the analytics summary (JSON)
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Do not count bare topic mentions as neutral feedback
        #[arg(long)]
        ignore_bare_mentions: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the calls in a saved executions file
    Logs {
        /// Input executions file (provider JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Only list completed calls
        #[arg(long)]
        completed_only: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the conversation of one call
    Conversation {
        /// Input executions file (provider JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Execution id
        #[arg(long)]
        id: String,

        /// Directory to save the raw execution JSON into
        #[arg(long)]
        save_dir: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            report,
            export_dir,
            agent_id,
            ignore_bare_mentions,
            verbose,
        } => {
            setup_logging(verbose);
            let config = analytics_config(ignore_bare_mentions);
            analyze_executions(input, output, report, export_dir, &agent_id, &config)
        }
        Commands::Fetch {
            agent_id,
            output,
            summary,
            ignore_bare_mentions,
            verbose,
        } => {
            setup_logging(verbose);
            let config = analytics_config(ignore_bare_mentions);
            fetch_executions(agent_id, output, summary, &config).await
        }
        Commands::Logs {
            input,
            completed_only,
            verbose,
        } => {
            setup_logging(verbose);
            list_calls(input, completed_only)
        }
        Commands::Conversation {
            input,
            id,
            save_dir,
            verbose,
        } => {
            setup_logging(verbose);
            show_conversation(input, &id, save_dir)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn analytics_config(ignore_bare_mentions: bool) -> AnalyticsConfig {
    AnalyticsConfig {
        neutral_on_mention: !ignore_bare_mentions,
    }
}

fn analyze_executions(
    input: PathBuf,
    output: Option<PathBuf>,
    report_path: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    agent_id: &str,
    config: &AnalyticsConfig,
) -> Result<()> {
    info!("Loading executions from {:?}", input);
    let records = load_records_file(&input).context("Failed to load executions")?;

    let summary = aggregate(&records, config);
    let report = SummaryReport::new(&summary);
    print!("{}", report.format());

    if let Some(path) = report_path {
        report.write_file(&path)?;
        info!("Report written to {:?}", path);
    }

    write_outputs(&summary, output, export_dir, agent_id)
}

async fn fetch_executions(
    agent_id: Option<String>,
    output: Option<PathBuf>,
    summary_path: Option<PathBuf>,
    config: &AnalyticsConfig,
) -> Result<()> {
    let provider_config = ProviderConfig::from_env()?;
    let agent_id = agent_id
        .or_else(|| provider_config.agent_id.clone())
        .context("No agent id given (use --agent-id or CALL_PROVIDER_AGENT_ID)")?;
    let client = ExecutionsClient::new(provider_config);

    info!("Fetching executions for agent {}", agent_id);
    let fetched = client
        .fetch_executions(&agent_id)
        .await
        .context("Unable to fetch call logs")?;

    let raw_path = output.unwrap_or_else(|| PathBuf::from(executions_file_name(&agent_id)));
    write_executions_json(&fetched.raw, &raw_path)?;
    info!("Executions written to {:?}", raw_path);

    let summary = aggregate(&fetched.records, config);
    print!("{}", SummaryReport::new(&summary).format());

    write_outputs(&summary, summary_path, None, &agent_id)
}

fn write_outputs(
    summary: &AnalyticsSummary,
    output: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    agent_id: &str,
) -> Result<()> {
    if let Some(path) = output {
        write_summary_json(summary, &path)?;
        info!("Summary written to {:?}", path);
    }

    if let Some(dir) = export_dir {
        let now = Utc::now();
        let path = dir.join(AnalyticsExport::file_name(agent_id, now));
        AnalyticsExport::new(agent_id, summary, now).write_json(&path)?;
        info!("Analytics exported to {:?}", path);
    }

    Ok(())
}

fn list_calls(input: PathBuf, completed_only: bool) -> Result<()> {
    let records = load_records_file(&input).context("Failed to load executions")?;
    let shown: Vec<_> = records
        .into_iter()
        .filter(|r| !completed_only || r.is_completed())
        .collect();

    println!("Call Logs ({} calls)", shown.len());
    println!("==========");
    print!("{}", format_call_log(&shown));
    Ok(())
}

fn show_conversation(input: PathBuf, id: &str, save_dir: Option<PathBuf>) -> Result<()> {
    let records = load_records_file(&input).context("Failed to load executions")?;
    let record = records
        .iter()
        .find(|r| r.id == id)
        .with_context(|| format!("Execution {} not found in {:?}", id, input))?;

    println!("Conversation {}", record.id);
    println!("=============");
    print!("{}", render_conversation(record));

    if let Some(dir) = save_dir {
        let content = std::fs::read_to_string(&input)
            .with_context(|| format!("Failed to read file: {:?}", input))?;
        let value: serde_json::Value =
            serde_json::from_str(&content).context("Failed to parse executions JSON")?;
        let raw = surveylens::io::execution_list(value)
            .into_iter()
            .find(|v| execution_id_of(v).as_deref() == Some(id))
            .with_context(|| format!("Execution {} not found in {:?}", id, input))?;

        let path = dir.join(execution_file_name(id));
        write_execution_json(&raw, &path)?;
        info!("Execution written to {:?}", path);
    }

    Ok(())
}
