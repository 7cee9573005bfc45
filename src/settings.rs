use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static` when set.
    pub static_dir: Option<String>,
    /// Comma-separated browser origins allowed to send credentials.
    pub cors_allowed_origins: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub search_debounce_ms: u64,
    /// Skins shown per category in the home page sections.
    pub featured_per_category: usize,
    /// Skins attached to each category in the category listing.
    pub preview_per_category: usize,
    pub related_limit: usize,
    /// Browsing sessions idle longer than this are dropped.
    pub session_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub url: String,
    pub email_from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    pub app: AppSettings,
    pub auth: AuthSettings,
}

impl Settings {
    /// Defaults, then `appsettings.{toml,json,...}` if present, then
    /// `SKINS__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(
                Environment::with_prefix("SKINS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog.session_ttl_seconds)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("catalog.search_debounce_ms", 300)?
            .set_default("catalog.featured_per_category", 8)?
            .set_default("catalog.preview_per_category", 6)?
            .set_default("catalog.related_limit", 4)?
            .set_default("catalog.session_ttl_seconds", 1800)?
            .set_default("app.name", "our app")?
            .set_default("app.url", "http://localhost:3000")?
            .set_default("app.email_from", "Acme <onboarding@resend.dev>")?
            .set_default("auth.base_url", "http://localhost:3000/api/auth")?
            .set_default("auth.timeout_seconds", 30)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3001,
                static_dir: None,
                cors_allowed_origins: None,
            },
            catalog: CatalogSettings {
                search_debounce_ms: 300,
                featured_per_category: 8,
                preview_per_category: 6,
                related_limit: 4,
                session_ttl_seconds: 1800,
            },
            app: AppSettings {
                name: "our app".to_string(),
                url: "http://localhost:3000".to_string(),
                email_from: "Acme <onboarding@resend.dev>".to_string(),
            },
            auth: AuthSettings {
                base_url: "http://localhost:3000/api/auth".to_string(),
                timeout_seconds: 30,
            },
        }
    }
}
