mod error;
mod models;
mod parsers;
mod render;
mod scanner;

use render::Palette;
use scanner::{Scanner, MAX_LINE_BYTES};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Diagnostics go to stderr, rendered lines own stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let palette = Palette::default();

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    info!("reading stdin...");

    let scanner = Scanner::new(&palette, MAX_LINE_BYTES, cancel);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout().lock();

    let code = match scanner.run(stdin, &mut stdout).await {
        Ok(_) => 0,
        Err(err) => {
            error!("scanning caught an error: {}", err);
            1
        }
    };

    // Exit directly: a blocking stdin read would otherwise hold the runtime open
    std::process::exit(code);
}

async fn shutdown_signal(cancel: CancellationToken) {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping after the current line...");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping after the current line...");
        }
    }

    cancel.cancel();
}
