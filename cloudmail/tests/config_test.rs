use std::time::Duration;

use cloudmail::config::{ConfigLoadError, RawConfig};
use cloudmail::{Config, EnvConfig};

fn complete() -> RawConfig {
    RawConfig {
        groq_api_key: Some("gsk_test".into()),
        email_user: Some("sender@example.com".into()),
        email_pass: Some("app-password".into()),
        origin: Some("http://localhost:5173".into()),
        port: 3001,
        groq_model: "llama3-8b-8192".into(),
        groq_api_base: "https://api.groq.com/openai/v1".into(),
        groq_timeout_secs: 30,
        smtp_host: "smtp.gmail.com".into(),
        smtp_port: 587,
        smtp_tls: "starttls".into(),
        smtp_timeout_secs: 10,
    }
}

#[test]
fn validate_names_every_missing_key() {
    let raw = RawConfig {
        groq_api_key: None,
        email_pass: Some("   ".into()),
        ..complete()
    };

    let err = Config::validate(raw).unwrap_err();
    match &err {
        ConfigLoadError::Missing(keys) => assert_eq!(keys, &["GROQ_API_KEY", "EMAIL_PASS"]),
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(
        err.to_string(),
        "Missing required environment variables: GROQ_API_KEY, EMAIL_PASS"
    );
}

#[test]
fn validated_config_feeds_clients() {
    let config = Config::validate(complete()).unwrap();

    let mailer = config.mailer();
    assert_eq!(mailer.username, "sender@example.com");
    assert_eq!(mailer.host, "smtp.gmail.com");
    assert_eq!(mailer.timeout, Duration::from_secs(10));

    let groq = config.groq();
    assert_eq!(groq.api_key, "gsk_test");
    assert_eq!(groq.timeout, Duration::from_secs(30));
}

#[test]
fn env_config_loads_from_environment() {
    std::env::set_var("GROQ_API_KEY", "gsk_env");
    std::env::set_var("EMAIL_USER", "me@example.com");
    std::env::set_var("EMAIL_PASS", "pw");
    std::env::set_var("ORIGIN", "http://localhost:5173");
    std::env::set_var("SMTP_PORT", "465");

    let raw = RawConfig::from_env().unwrap();
    assert_eq!(raw.groq_api_key.as_deref(), Some("gsk_env"));
    assert_eq!(raw.smtp_port, 465);
    assert_eq!(raw.smtp_host, "smtp.gmail.com");

    let config = Config::validate(raw).unwrap();
    assert_eq!(config.email_user, "me@example.com");

    for key in ["GROQ_API_KEY", "EMAIL_USER", "EMAIL_PASS", "ORIGIN", "SMTP_PORT"] {
        std::env::remove_var(key);
    }
}
