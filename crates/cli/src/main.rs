mod config_commands;
mod route_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "herald", about = "Herald, chatops notifications for Kubernetes clusters")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (defaults to ./herald.{toml,yaml,yml,json}, then the
    /// user config dir).
    #[arg(long, global = true, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,

    /// Print the metrics recorded by the command to stderr, in Prometheus
    /// text format.
    #[cfg(feature = "metrics")]
    #[arg(long, global = true, default_value_t = false)]
    metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
    /// Show which channels an event would be delivered to.
    Route {
        /// Event as JSON.
        #[arg(long)]
        event: PathBuf,
        /// Source that produced the event. Repeatable.
        #[arg(long = "source")]
        sources: Vec<String>,
        /// Also print the notification as it would be rendered.
        #[arg(long)]
        render: bool,
    },
    /// Show the command an interaction payload resolves to.
    Resolve {
        /// Block action as JSON.
        #[arg(long)]
        payload: PathBuf,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    // stdout carries command output
    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);
    debug!(version = env!("CARGO_PKG_VERSION"), "herald starting");

    #[cfg(feature = "metrics")]
    let metrics = herald_metrics::init_metrics(herald_metrics::MetricsRecorderConfig {
        enabled: cli.metrics,
        ..Default::default()
    })?;
    #[cfg(feature = "metrics")]
    let dump_metrics = cli.metrics;

    let result = match cli.command {
        Commands::Config { action } => {
            config_commands::handle_config(action, cli.config.as_deref())
        },
        Commands::Route {
            event,
            sources,
            render,
        } => {
            let path = herald_config::resolve_config_path(cli.config.as_deref())?;
            route_commands::route(&path, &event, &sources, render)
        },
        Commands::Resolve { payload } => route_commands::resolve_payload(&payload),
    };

    #[cfg(feature = "metrics")]
    if dump_metrics {
        eprintln!("{}", metrics.render());
    }
    result
}
