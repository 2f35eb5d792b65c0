use anyhow::Context;
use biblio_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Books catalogue service
#[derive(Debug, Parser)]
#[command(name = "biblio", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override the configured listen port
        #[arg(long, env = "BIBLIO_PORT")]
        port: Option<u16>,
    },
    /// Print the resolved configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load biblio settings")?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            biblio_telemetry::init(&settings.telemetry)?;
            tracing::info!(
                environment = ?settings.environment,
                address = %settings.server.bind_address(),
                "biblio starting"
            );
            biblio_app::run(settings).await
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
