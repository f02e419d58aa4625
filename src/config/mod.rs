use crate::auth::credentials::CredentialRecord;
use crate::errors::{AppError, AppResult};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    #[serde(default = "default_window_days")]
    pub dashboard_window_days: u32,
    #[serde(default = "default_chart_bucket_cap")]
    pub chart_bucket_cap: usize,
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: u32,
    #[serde(default = "default_lockout_reset_delay_ms")]
    pub lockout_reset_delay_ms: u64,
    #[serde(default = "default_lockout_window_minutes")]
    pub lockout_window_minutes: i64,
    #[serde(default = "default_credentials")]
    pub credentials: Vec<CredentialRecord>,
}

fn default_session_ttl_hours() -> i64 {
    24 * 7
}
fn default_window_days() -> u32 {
    14
}
fn default_chart_bucket_cap() -> usize {
    crate::core::dashboard::CHART_BUCKET_CAP
}
fn default_max_login_attempts() -> u32 {
    5
}
fn default_max_code_attempts() -> u32 {
    3
}
fn default_lockout_reset_delay_ms() -> u64 {
    3000
}
fn default_lockout_window_minutes() -> i64 {
    15
}

/// The two built-in accounts of the static identity provider.
/// Secrets are stored only as salted digests.
fn default_credentials() -> Vec<CredentialRecord> {
    vec![
        CredentialRecord::new("admin", "Admin@123", "123456", "admin"),
        CredentialRecord::new("member", "Member@123", "654321", "member"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db_path: PathBuf) -> Self {
        Self {
            database: db_path.to_string_lossy().to_string(),
            session_ttl_hours: default_session_ttl_hours(),
            dashboard_window_days: default_window_days(),
            chart_bucket_cap: default_chart_bucket_cap(),
            max_login_attempts: default_max_login_attempts(),
            max_code_attempts: default_max_code_attempts(),
            lockout_reset_delay_ms: default_lockout_reset_delay_ms(),
            lockout_window_minutes: default_lockout_window_minutes(),
            credentials: default_credentials(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("teamdeck")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".teamdeck")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("teamdeck.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("teamdeck.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        if cfg.credentials.is_empty() {
            return Err(AppError::Config(
                "at least one credential record is required".into(),
            ));
        }
        Ok(cfg)
    }

    /// Session lifetime, at least one hour.
    pub fn session_ttl(&self) -> AppResult<TimeDelta> {
        TimeDelta::try_hours(self.session_ttl_hours.max(1)).ok_or_else(|| {
            AppError::Config(format!(
                "session_ttl_hours out of range: {}",
                self.session_ttl_hours
            ))
        })
    }

    /// How far back sign-in failures count toward the lockout.
    pub fn lockout_window(&self) -> AppResult<TimeDelta> {
        TimeDelta::try_minutes(self.lockout_window_minutes.max(0)).ok_or_else(|| {
            AppError::Config(format!(
                "lockout_window_minutes out of range: {}",
                self.lockout_window_minutes
            ))
        })
    }

    /// Serialize the configuration as YAML.
    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Initialize configuration and database files.
    /// Returns the configuration that was written (or would have been, in test mode).
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Self::with_database(db_path.clone());

        // In test mode il file di configurazione non viene toccato
        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = config.to_yaml()?;
            let mut file = fs::File::create(Self::config_file()).map_err(|_| AppError::ConfigSave)?;
            file.write_all(yaml.as_bytes())
                .map_err(|_| AppError::ConfigSave)?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(config)
    }
}
