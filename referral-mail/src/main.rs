//! referral-mail: template and send API server

use referral_mail::api::ApiServer;
use referral_mail::config::LoggingConfig;
use referral_mail::mailer::SmtpMailer;
use referral_mail::templates::SqliteTemplateStore;
use referral_mail::Config;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = if let Some(config_path) = std::env::args().nth(1) {
        Config::from_file(Path::new(&config_path))?
    } else if Path::new("config.toml").exists() {
        Config::from_file("config.toml")?
    } else {
        Config::default()
    };
    let config = config.apply_env()?;

    init_logging(&config.logging);

    info!("Starting referral-mail v{}", env!("CARGO_PKG_VERSION"));
    info!("  API listening on: {}", config.server.listen_addr);
    info!("  Database: {}", config.storage.database_url);
    info!("  SMTP relay: {}:{}", config.smtp.host, config.smtp.port);

    let store = SqliteTemplateStore::connect(&config.storage.database_url).await?;

    let mailer = SmtpMailer::new(&config.smtp);
    if !mailer.is_configured() {
        warn!("SMTP credentials missing, every send will fail until SMTP_USER and SMTP_PASSWORD are set");
    }

    let server = ApiServer::new(Arc::new(store), Arc::new(mailer), &config.server);
    server.run().await?;

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("referral_mail={},tower_http=info", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
