use anyhow::Result;
use clap::{Parser, Subcommand};
use triage::cli::commands;

#[derive(Parser)]
#[command(name = "triage")]
#[command(
  about = "Triage - Network Incident Retrieval Assistant\nRetrieval-augmented ingestion, search, and resolution planning for network operations"
)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", courtesy of Pelagic Works"))]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Validate an incident record without ingesting it
  Validate {
    /// Path to a JSON incident record, or - for stdin
    #[arg(short, long)]
    file: String,
  },
  /// Ingest a single incident into the knowledge base
  Ingest {
    /// Path to a JSON incident record, or - for stdin
    #[arg(short, long)]
    file: String,
  },
  /// Ingest a batch of incidents from JSONL or a JSON array
  Batch {
    /// Path to a JSONL file or JSON array, or - for stdin
    #[arg(short, long)]
    file: String,
  },
  /// Search for incidents similar to a free-text query
  Search {
    /// Search query text
    query: String,
    /// Number of similar incidents to retrieve
    #[arg(short, long, default_value = "5")]
    neighbors: usize,
  },
  /// Report historical patterns matching an incident
  Analyze {
    /// Description of the incident under investigation
    #[arg(short, long)]
    description: String,
    /// Affected service or customer impact
    #[arg(short, long)]
    service_impact: String,
  },
  /// Generate a resolution plan from similar past incidents
  Plan {
    /// Description of the incident to plan for
    #[arg(short, long)]
    incident: String,
    /// Read historical context from a file instead of querying the index
    #[arg(short, long)]
    context_file: Option<String>,
  },
  /// Show the agent manifests exposed to the LLM runtime
  Agents,
  /// Show local incident log statistics
  Stats,
  /// Start the HTTP tool server
  Serve {
    /// Host interface to bind
    #[arg(long, default_value = "127.0.0.1", env = "TRIAGE_HOST")]
    host: String,
    /// Port to bind
    #[arg(short, long, default_value = "8090", env = "TRIAGE_PORT")]
    port: u16,
  },
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::Validate { file } => commands::validate_file(&file).await,
    Command::Ingest { file } => commands::ingest_file(&file).await,
    Command::Batch { file } => commands::batch_file(&file).await,
    Command::Search { query, neighbors } => commands::search(&query, neighbors).await,
    Command::Analyze { description, service_impact } => {
      commands::analyze(&description, &service_impact).await
    }
    Command::Plan { incident, context_file } => {
      commands::plan(&incident, context_file.as_deref()).await
    }
    Command::Agents => commands::show_agents(),
    Command::Stats => commands::stats(),
    Command::Serve { host, port } => commands::serve(&host, port).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  handle(cli.command).await?;
  Ok(())
}
