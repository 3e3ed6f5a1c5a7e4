use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use streamgraph_dashboard::render::render;
use streamgraph_dashboard::{Dashboard, DashboardConfig, Section};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "streamgraph-dashboard")]
#[command(about = "Streamgraph terminal dashboard", long_about = None)]
struct Cli {
    /// Gateway base URL (including /api)
    #[arg(long)]
    api_url: Option<String>,

    /// Seconds between health probes and refreshes
    #[arg(long)]
    poll_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the gateway and redraw the dashboard until Ctrl-C
    Watch {
        /// Show the analytics section instead of the overview
        #[arg(long)]
        analytics: bool,
    },
    /// Refresh once and print the dashboard
    Status,
    /// Export topics and producers as JSON
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenvy::dotenv();
    fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let mut config = DashboardConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    if let Some(secs) = cli.poll_secs.filter(|s| *s > 0) {
        config.poll_interval = Duration::from_secs(secs);
    }

    let dashboard = Arc::new(Dashboard::new(config));

    match cli.command.unwrap_or(Commands::Watch { analytics: false }) {
        Commands::Watch { analytics } => {
            if analytics {
                let _ = dashboard.show_section(Section::Analytics).await;
            }
            let runner = tokio::spawn(Arc::clone(&dashboard).run(async {
                let _ = tokio::signal::ctrl_c().await;
            }));

            let mut redraw = tokio::time::interval(Duration::from_millis(500));
            while !runner.is_finished() {
                redraw.tick().await;
                print!("\x1b[2J\x1b[H{}", render(&dashboard.view()));
            }
            runner.await?;
        }
        Commands::Status => {
            dashboard.probe_health().await;
            dashboard.refresh().await?;
            print!("{}", render(&dashboard.view()));
        }
        Commands::Export { out } => {
            let path = dashboard.export(&out).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
