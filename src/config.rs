use std::env;

/// AppConfig
///
/// Holds the application's configuration. Loaded once at startup and never mutated,
/// it is pulled into handlers through `FromRef` alongside the repository.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Connection string for the SQLite store.
    pub db_url: String,
    // Upper bound for the store pool.
    pub db_max_connections: u32,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Runtime environment marker. Selects log format and config strictness.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context: relaxed defaults for local development,
/// explicit settings for production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_LOCAL_DB_URL: &str = "sqlite://blog.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for tests: an in-memory store and an ephemeral port.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            bind_addr: "127.0.0.1:0".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (call `dotenv` first).
    ///
    /// # Panics
    /// Panics in production when `DATABASE_URL` is missing, and in any environment when
    /// `DB_MAX_CONNECTIONS` is set but not a positive integer. The process must not
    /// start against an unintended store.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let db_url = match env {
            Env::Production => {
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")
            }
            Env::Local => {
                env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_LOCAL_DB_URL.to_string())
            }
        };

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .expect("FATAL: DB_MAX_CONNECTIONS must be a positive integer"),
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Self {
            db_url,
            db_max_connections,
            bind_addr,
            env,
        }
    }
}
