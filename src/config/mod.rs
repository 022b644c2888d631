use crate::errors::{EventsError, EventsResult};

pub const DEFAULT_BASE_URL: &str = "https://app.ticketmaster.com/discovery/v2";

/// Page size shared by both sources. The provider fixes its page size at 12;
/// the local store queries the same amount so neither origin dominates a page.
pub const PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub db_path: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> EventsResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        let api_key = std::env::var("TICKETMASTER_API_KEY")
            .map_err(|_| EventsError::MissingEnvVar("TICKETMASTER_API_KEY".to_string()))?;

        let base_url = std::env::var("TICKETMASTER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        // Default db_path is relative to executable directory
        let db_path = std::env::var("EVENTS_DB_PATH").unwrap_or_else(|_| {
            exe_dir
                .map(|d| d.join("events.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./events.db".to_string())
        });

        Ok(Self {
            api_key,
            base_url,
            db_path,
        })
    }
}
