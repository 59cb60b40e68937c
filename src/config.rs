use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// WhatsApp-enabled sender number, without the `whatsapp:` prefix.
    pub sender: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    pub ttl_seconds: i64,
    pub sweep_interval_secs: u64,
}

/// Outbound mail settings. Loaded for completeness, nothing in the
/// registration flow sends mail.
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub twilio: TwilioConfig,
    pub otp: OtpConfig,
    pub mail: Option<MailConfig>,
    pub gemini_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} is not set"));

        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("DATABASE_URI"))
            .context("DATABASE_URL is not set")?;

        let twilio = TwilioConfig {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
            sender: required("TWILIO_WHATSAPP_NUMBER")?,
            api_base: lookup("TWILIO_API_BASE")
                .unwrap_or_else(|| "https://api.twilio.com".into()),
            timeout_secs: parse_or(&lookup, "TWILIO_TIMEOUT_SECS", 10)?,
        };

        let otp = OtpConfig {
            ttl_seconds: parse_or(&lookup, "OTP_TTL_SECONDS", 300)?,
            sweep_interval_secs: parse_or(&lookup, "OTP_SWEEP_INTERVAL_SECS", 60)?,
        };
        anyhow::ensure!(otp.ttl_seconds > 0, "OTP_TTL_SECONDS must be positive");
        anyhow::ensure!(
            otp.sweep_interval_secs > 0,
            "OTP_SWEEP_INTERVAL_SECS must be positive"
        );

        // all-or-nothing: a half-configured mailer is a typo, not an opt-out
        let mail = match lookup("MAIL_HOST") {
            None => None,
            Some(host) => Some(MailConfig {
                host,
                port: parse_or(&lookup, "MAIL_PORT", 587)?,
                user: required("MAIL_USER")?,
                username: required("MAIL_USERNAME")?,
                password: required("MAIL_PASSWORD")?,
                from_email: required("MAIL_FROM_EMAIL")?,
                from_username: required("MAIL_FROM_USERNAME")?,
            }),
        };

        Ok(Self {
            database_url,
            twilio,
            otp,
            mail,
            gemini_api_key: lookup("GEMINI_API_KEY"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key}: invalid value {raw:?}: {e}")),
    }
}
