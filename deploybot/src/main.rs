use clap::Parser;
use deploybot::config::{Args, Command};
use deploybot::notify::DeploymentEvent;
use deploybot::{Application, Config, telemetry};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

/// Forward newline-delimited JSON events from stdin until EOF or a shutdown signal.
async fn listen(app: &Application) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown => {
                app.cancel();
                break;
            }
        };

        let Some(line) = line else {
            tracing::info!("End of input, draining notifications");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<DeploymentEvent>(&line) {
            Ok(event) => {
                tracing::debug!(apply_id = event.apply_id, status = %event.status, "Received deployment event");
                app.notify(event);
            }
            Err(e) => tracing::warn!(error = %e, "Skipping malformed event line"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Load and validate configuration
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    // Initialize telemetry (tracing + optional OpenTelemetry)
    telemetry::init_telemetry(config.enable_otel_export)?;

    tracing::debug!("{:?}", args);

    let app = Application::new(config).await?;

    let result = match args.command.unwrap_or(Command::Listen) {
        Command::Send {
            apply_id,
            status,
            mode,
            title,
        } => {
            if !app.notify(DeploymentEvent::new(apply_id, mode, status, title)) {
                tracing::warn!(apply_id, "Notification was not queued");
            }
            Ok(())
        }
        Command::Listen => listen(&app).await,
    };

    app.shutdown().await;
    telemetry::shutdown_telemetry();
    result
}
