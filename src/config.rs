use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub server_addr: String,
    /// Inactivity window in seconds; every authenticated request pushes the expiry forward.
    pub session_ttl: usize,
    pub cookie_secure: bool,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,

    /// Printed on statements ("LIEU DE STAGE PRINCIPAL") and in the signature block.
    pub workplace: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let session_secret =
            env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        if session_secret.len() < 16 {
            bail!("SESSION_SECRET must be at least 16 bytes long");
        }

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://stagiaires.db".to_string()),
            session_secret,
            session_ttl: parse_or("SESSION_TTL", 600)?, // 10 min
            cookie_secure: parse_or("COOKIE_SECURE", false)?,

            rate_login_per_min: parse_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parse_or("RATE_REGISTER_PER_MIN", 30)?,

            workplace: env::var("WORKPLACE").unwrap_or_else(|_| "ANTANANARIVO".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}
