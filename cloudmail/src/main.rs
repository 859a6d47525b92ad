use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::Context as _;
use cloudmail::generation::GroqClient;
use cloudmail::mail::{DeliveryClient, SmtpMailer};
use cloudmail::orchestrator::{router, AppState};
use cloudmail::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let generator = GroqClient::new(config.groq()).context("building generation client")?;
    let mailer = SmtpMailer::from_config(config.mailer()).context("building SMTP transport")?;
    let delivery = DeliveryClient::new(Arc::new(mailer), config.email_user.clone());
    let state = AppState::new(Arc::new(generator), delivery);

    let routes = router(state, &config.origin)?;

    tracing::info!("Email service configured with: {}", config.email_user);
    tracing::info!("Groq API configured (model {})", config.groq_model);

    cloudmail::serve((Ipv4Addr::UNSPECIFIED, config.port), routes).await?;
    Ok(())
}
