use std::sync::Arc;

use {
    clap::Parser,
    tokio_util::task::TaskTracker,
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    mailferry_config::Config,
    mailferry_mailer::SmtpMailer,
    mailferry_relay::Relay,
    mailferry_telegram::TelegramFetcher,
};

/// How long shutdown waits for in-flight relay operations to reach a
/// terminal state (and reclaim their spooled files).
const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "mailferry", about = "Mailferry — Telegram → email file relay")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "mailferry starting");

    // Fail fast: no event source starts until every required setting is
    // present and the mail addresses parse.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        },
    };
    let mailer = match SmtpMailer::new(&config.smtp) {
        Ok(mailer) => mailer,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        },
    };

    let bot = mailferry_telegram::connect(&config.telegram_token).await?;
    let relay = Arc::new(Relay::new(
        Arc::new(TelegramFetcher::new(bot.clone())),
        Arc::new(mailer),
        &config.smtp.from,
        &config.smtp.to,
    ));
    info!(recipient = %relay.recipient(), "relaying attachments");

    let tracker = TaskTracker::new();
    let cancel = mailferry_telegram::start_polling(bot, relay, tracker.clone());

    tokio::select! {
        _ = shutdown_signal() => info!("shutdown signal received"),
        // The polling loop cancels itself when another instance takes over
        // the token.
        _ = cancel.cancelled() => {},
    }
    cancel.cancel();

    // Let in-flight operations finish their cleanup before exiting. Spool
    // files live in the OS temp directory, so even a forced exit after the
    // grace period leaves nothing long-lived behind.
    tracker.close();
    if tokio::time::timeout(SHUTDOWN_GRACE, tracker.wait()).await.is_err() {
        warn!("shutdown grace period expired with relay operations still in flight");
    }

    info!("mailferry stopped");
    Ok(())
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

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "could not install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "could not install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
