use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::services::completion::CompletionConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_max_files: String,
    pub cors_origins: Vec<String>,
    pub database_path: String,
    pub groq_api_key: String,
    pub groq_base_url: String,
    pub groq_model: String,
    pub groq_timeout_seconds: u64,
    pub groq_retries: u32,
    pub groq_backoff_seconds: f64,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    pub fn init_global() -> anyhow::Result<&'static Config> {
        let cfg = Config::from_env();
        CONFIG
            .set(cfg)
            .map_err(|_| anyhow::anyhow!("config already initialized"))?;
        Ok(CONFIG.get().expect("config"))
    }

    pub fn get() -> &'static Config {
        CONFIG.get().expect("Config not initialized")
    }

    fn from_env() -> Config {
        let read_u64 = |key: &str, def: u64| -> u64 {
            match std::env::var(key) {
                Ok(v) => v.parse::<u64>().unwrap_or(def),
                Err(_) => def,
            }
        };
        let read_f64 = |key: &str, def: f64| -> f64 {
            match std::env::var(key) {
                Ok(v) => v.parse::<f64>().unwrap_or(def),
                Err(_) => def,
            }
        };

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_max_files = std::env::var("LOG_MAX_FILES").unwrap_or_else(|_| "7d".to_string());

        let cors_origins = match std::env::var("CORS_ORIGINS") {
            Ok(v) => v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => vec!["*".to_string()],
        };

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/summaries.db".to_string());

        let groq_api_key = std::env::var("GROQ_API_KEY").unwrap_or_default();
        let groq_base_url = std::env::var("GROQ_BASE_URL")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
        let groq_model =
            std::env::var("GROQ_MODEL").unwrap_or_else(|_| "llama3-70b-8192".to_string());

        let groq_timeout_seconds = read_u64("GROQ_TIMEOUT_SECONDS", 30);
        let groq_retries = read_u64("GROQ_RETRIES", 3).min(u32::MAX as u64) as u32;
        let groq_backoff_seconds = read_f64("GROQ_BACKOFF_SECONDS", 1.0).max(0.0);

        Config {
            host,
            port,
            log_level,
            log_max_files,
            cors_origins,
            database_path,
            groq_api_key,
            groq_base_url,
            groq_model,
            groq_timeout_seconds,
            groq_retries,
            groq_backoff_seconds,
        }
    }

    /// The immutable slice of configuration handed to the completion client
    /// constructor.
    pub fn completion(&self) -> CompletionConfig {
        CompletionConfig {
            api_key: self.groq_api_key.clone(),
            base_url: self.groq_base_url.clone(),
            model: self.groq_model.clone(),
            attempt_timeout: Duration::from_secs(self.groq_timeout_seconds),
            max_attempts: self.groq_retries.max(1),
            base_backoff: Duration::from_secs_f64(self.groq_backoff_seconds),
        }
    }

    pub fn print(&self) {
        println!("Configuration:");
        println!("  - HOST: {}", self.host);
        println!("  - PORT: {}", self.port);
        println!("  - LOG_LEVEL: {}", self.log_level);
        println!("  - DATABASE_PATH: {}", self.database_path);
        println!("  - GROQ_BASE_URL: {}", self.groq_base_url);
        println!(
            "  - GROQ_API_KEY: {}",
            if self.groq_api_key.is_empty() {
                "not set"
            } else {
                "set"
            }
        );
        println!("  - GROQ_MODEL: {}", self.groq_model);
        println!("  - Completion client:");
        println!("    • GROQ_TIMEOUT_SECONDS: {}", self.groq_timeout_seconds);
        println!("    • GROQ_RETRIES: {}", self.groq_retries);
        println!("    • GROQ_BACKOFF_SECONDS: {}", self.groq_backoff_seconds);
    }
}
