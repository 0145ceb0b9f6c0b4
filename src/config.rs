use std::net::SocketAddr;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ORIGIN: &str = "http://localhost:5173";

/// Server settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ORIGIN.to_string()],
        }
    }
}

impl ServerConfig {
    /// Load from environment variables:
    /// - `PORT`: listen port (default 3000)
    /// - `ORIGIN`: space separated CORS origins (default the Vite dev server)
    pub fn from_env() -> Self {
        Self::from_vars(std::env::var("PORT").ok(), std::env::var("ORIGIN").ok())
    }

    fn from_vars(port: Option<String>, origin: Option<String>) -> Self {
        let defaults = Self::default();

        let port = match port {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid PORT {:?}, using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let allowed_origins: Vec<String> = origin
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let allowed_origins = if allowed_origins.is_empty() {
            defaults.allowed_origins
        } else {
            allowed_origins
        };

        Self {
            port,
            allowed_origins,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
