mod bots_file;

use {
    apiary_queue::MemoryJobQueue,
    apiary_responder::EchoResponder,
    apiary_runtime::{Capabilities, Orchestrator},
    apiary_store::MemoryStore,
    apiary_transport::ConsoleTransport,
    clap::{Parser, Subcommand},
    std::{path::PathBuf, sync::Arc},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "apiary", about = "Apiary, a multi-tenant chat-bot session host")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Path to the bot definitions file.
    #[arg(long, global = true, env = "APIARY_BOTS_FILE", default_value = "bots.toml")]
    bots_file: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configured bot until interrupted (default when no
    /// subcommand is provided).
    Serve,
    /// Validate the bot definitions file and exit.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "apiary starting");

    match cli.command {
        None | Some(Commands::Serve) => serve(&cli.bots_file).await,
        Some(Commands::Check) => check(&cli.bots_file),
    }
}

/// Seed the in-memory store from the definitions file, start every bot on
/// the console transport, and run until Ctrl-C.
async fn serve(bots_file: &std::path::Path) -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let seeded = bots_file::seed_store(bots_file, &store)?;
    info!(bots = seeded, path = %bots_file.display(), "bot definitions loaded");

    let orchestrator = Orchestrator::new(Capabilities {
        transport: Arc::new(ConsoleTransport::new()),
        store,
        responder: Arc::new(EchoResponder),
        queue: Arc::new(MemoryJobQueue::new()),
    });

    let summary = orchestrator.start_all_active().await?;
    info!(started = summary.started, failed = summary.failed, "apiary is up");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    orchestrator.shutdown();
    Ok(())
}

fn check(bots_file: &std::path::Path) -> anyhow::Result<()> {
    let file = bots_file::load(bots_file)?;
    let workflows: usize = file.bots.iter().map(|b| b.workflows.len()).sum();
    println!(
        "{}: {} bot(s), {} workflow(s), all valid",
        bots_file.display(),
        file.bots.len(),
        workflows
    );
    Ok(())
}
