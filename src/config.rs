use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::time::Duration;

/// Gateway's upper bound on receipt length.
pub const MAX_RECEIPT_LEN: usize = 40;
const MAX_RECEIPT_PREFIX_LEN: usize = 10;
const MAX_GATEWAY_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const MAX_GRANT_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => bail!("Unknown LOG_FORMAT: {}", format),
        }
    }
}

/// What is being sold. The price is always explicit configuration.
#[derive(Debug, Clone)]
pub struct ProductConfig {
    pub name: String,
    pub amount: u64,
    pub currency: String,
    pub receipt_prefix: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,

    // Razorpay
    pub razorpay_key_id: String,
    pub razorpay_key_secret: SecretString,
    pub razorpay_api_url: String,
    pub gateway_timeout: Duration,

    pub product: ProductConfig,

    // Fulfillment
    pub ebook_path: PathBuf,
    pub ebook_filename: String,
    pub public_dir: PathBuf,
    pub download_limit: u32,
    pub grant_ttl: Duration,
    pub grant_capacity: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let environment = Self::parse_environment(&vars.or("ENVIRONMENT", "development"))?;

        let config = Self {
            environment,
            host: vars.or("HOST", "0.0.0.0"),
            port: vars.required("PORT")?.parse().context("Invalid PORT")?,
            log_format: LogFormat::parse(&vars.or("LOG_FORMAT", "pretty"))?,

            razorpay_key_id: vars.required("RAZORPAY_KEY_ID")?,
            razorpay_key_secret: SecretString::new(vars.required("RAZORPAY_KEY_SECRET")?),
            razorpay_api_url: vars
                .or("RAZORPAY_API_URL", "https://api.razorpay.com")
                .trim_end_matches('/')
                .to_string(),
            gateway_timeout: Duration::from_secs(
                vars.or("GATEWAY_TIMEOUT_SECS", "15")
                    .parse()
                    .context("Invalid GATEWAY_TIMEOUT_SECS")?,
            ),

            product: ProductConfig {
                name: vars.or("PRODUCT_NAME", "ChatGPT for Teachers"),
                amount: vars
                    .required("PRODUCT_AMOUNT")?
                    .parse()
                    .context("Invalid PRODUCT_AMOUNT")?,
                currency: vars.or("PRODUCT_CURRENCY", "INR"),
                receipt_prefix: vars.or("RECEIPT_PREFIX", "ebook"),
            },

            ebook_path: PathBuf::from(vars.or("EBOOK_PATH", "download/draft3.pdf")),
            ebook_filename: vars.or("EBOOK_FILENAME", "ChatGPT for Teachers.pdf"),
            public_dir: PathBuf::from(vars.or("PUBLIC_DIR", "public")),
            download_limit: vars
                .or("DOWNLOAD_LIMIT", "3")
                .parse()
                .context("Invalid DOWNLOAD_LIMIT")?,
            grant_ttl: Duration::from_secs(
                vars.or("GRANT_TTL_SECS", "86400")
                    .parse()
                    .context("Invalid GRANT_TTL_SECS")?,
            ),
            grant_capacity: vars
                .or("GRANT_CAPACITY", "100000")
                .parse()
                .context("Invalid GRANT_CAPACITY")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment(env: &str) -> Result<Environment> {
        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.razorpay_key_id.trim().is_empty() {
            bail!("RAZORPAY_KEY_ID must not be empty");
        }
        if self.razorpay_key_secret.expose_secret().is_empty() {
            bail!("RAZORPAY_KEY_SECRET must not be empty");
        }
        if self.environment == Environment::Production
            && !self.razorpay_key_id.starts_with("rzp_live_")
        {
            bail!("Production requires a live RAZORPAY_KEY_ID (rzp_live_...)");
        }
        if !self.razorpay_api_url.starts_with("http") {
            bail!("RAZORPAY_API_URL must be HTTP(S) URL");
        }
        if self.gateway_timeout.is_zero() || self.gateway_timeout > MAX_GATEWAY_TIMEOUT {
            bail!(
                "GATEWAY_TIMEOUT_SECS must be between 1 and {}",
                MAX_GATEWAY_TIMEOUT.as_secs()
            );
        }

        if self.product.amount == 0 {
            bail!("PRODUCT_AMOUNT must be greater than zero");
        }
        let currency = &self.product.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            bail!("PRODUCT_CURRENCY must be a 3-letter uppercase code, got {}", currency);
        }
        let prefix = &self.product.receipt_prefix;
        if prefix.is_empty()
            || prefix.len() > MAX_RECEIPT_PREFIX_LEN
            || !prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            bail!(
                "RECEIPT_PREFIX must be 1-{} characters of [A-Za-z0-9_-]",
                MAX_RECEIPT_PREFIX_LEN
            );
        }

        // Ends up inside a quoted Content-Disposition parameter
        if self.ebook_filename.is_empty()
            || self
                .ebook_filename
                .chars()
                .any(|c| c == '"' || c == '\\' || c.is_control())
        {
            bail!("EBOOK_FILENAME must be non-empty without quotes, backslashes or control characters");
        }
        if self.download_limit == 0 {
            bail!("DOWNLOAD_LIMIT must be at least 1");
        }
        if self.grant_ttl.is_zero() || self.grant_ttl > MAX_GRANT_TTL {
            bail!(
                "GRANT_TTL_SECS must be between 1 and {}",
                MAX_GRANT_TTL.as_secs()
            );
        }
        if self.grant_capacity == 0 {
            bail!("GRANT_CAPACITY must be at least 1");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, name: &str) -> Result<String> {
        (self.0)(name).with_context(|| format!("{} required", name))
    }

    fn or(&self, name: &str, default: &str) -> String {
        (self.0)(name).unwrap_or_else(|| default.to_string())
    }
}
