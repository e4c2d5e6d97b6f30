use std::env;

/// AppConfig
///
/// Holds the service's entire configuration state. Loaded once at startup and
/// immutable afterwards; it is pulled into handlers and extractors via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local `x-user-id` bypass.
    pub env: Env,
    // Secret key used to decode and validate incoming session tokens.
    pub jwt_secret: String,
    // Socket address the HTTP listener binds to.
    pub bind_addr: String,
    // JSON file holding the user directory. Optional locally (empty directory).
    pub directory_path: Option<String>,
}

/// Env
///
/// Defines the runtime context, used to switch between developer conveniences
/// (header bypass, pretty logs) and the hardened production setup.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const LOCAL_JWT_SECRET: &str = "mill-portal-local-development-secret";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// Non-panicking configuration for tests and state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            directory_path: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables.
    ///
    /// # Panics
    /// Panics in production when `JWT_SECRET` or `USER_DIRECTORY_PATH` is not
    /// set, so the service never starts with an incomplete configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                bind_addr,
                // Locally an empty directory is fine; the developer can still log in as admin via a token.
                directory_path: env::var("USER_DIRECTORY_PATH").ok(),
            },
            Env::Production => Self {
                env: Env::Production,
                jwt_secret: env::var("JWT_SECRET")
                    .expect("FATAL: JWT_SECRET must be set in production."),
                bind_addr,
                directory_path: Some(
                    env::var("USER_DIRECTORY_PATH")
                        .expect("FATAL: USER_DIRECTORY_PATH required in prod"),
                ),
            },
        }
    }
}
