use crate::error::{Result, LeadgenError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// DatabaseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Relative paths resolve against the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub backup_before_run: bool,
}

// ---------------------------------------------------------------------------
// LinkedinConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedinConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_connection_limit")]
    pub connection_limit_per_day: u32,
    #[serde(default = "default_message_limit")]
    pub message_limit_per_day: u32,
    #[serde(default = "default_true")]
    pub profile_finder_enabled: bool,
    #[serde(default = "default_profile_finder_limit")]
    pub profile_finder_limit: u32,
}

fn default_true() -> bool {
    true
}

fn default_connection_limit() -> u32 {
    25
}

fn default_message_limit() -> u32 {
    20
}

fn default_profile_finder_limit() -> u32 {
    50
}

impl Default for LinkedinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            connection_limit_per_day: default_connection_limit(),
            message_limit_per_day: default_message_limit(),
            profile_finder_enabled: true,
            profile_finder_limit: default_profile_finder_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_emails_per_day")]
    pub emails_per_day: u32,
    #[serde(default = "default_follow_up_days")]
    pub follow_up_days: u32,
    #[serde(default = "default_max_follow_ups")]
    pub max_follow_ups: u32,
}

fn default_emails_per_day() -> u32 {
    50
}

fn default_follow_up_days() -> u32 {
    3
}

fn default_max_follow_ups() -> u32 {
    2
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            emails_per_day: default_emails_per_day(),
            follow_up_days: default_follow_up_days(),
            max_follow_ups: default_max_follow_ups(),
        }
    }
}

// ---------------------------------------------------------------------------
// PacingConfig
// ---------------------------------------------------------------------------

/// Window for the blocking delay after each simulated send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_min_delay")]
    pub min_delay_secs: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
}

fn default_min_delay() -> u64 {
    30
}

fn default_max_delay() -> u64 {
    90
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay(),
            max_delay_secs: default_max_delay(),
        }
    }
}

impl PacingConfig {
    pub fn none() -> Self {
        Self {
            min_delay_secs: 0,
            max_delay_secs: 0,
        }
    }

    /// Inverted windows collapse to `min`.
    pub fn bounds(&self) -> (Duration, Duration) {
        let min = self.min_delay_secs;
        let max = self.max_delay_secs.max(min);
        (Duration::from_secs(min), Duration::from_secs(max))
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "leadgen".to_string(),
            sender_name: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigOverrides
// ---------------------------------------------------------------------------

/// Per-invocation overrides (CLI flags). Each `Some` replaces exactly one field.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub connection_limit_per_day: Option<u32>,
    pub message_limit_per_day: Option<u32>,
    pub emails_per_day: Option<u32>,
    pub follow_up_days: Option<u32>,
    pub max_follow_ups: Option<u32>,
    pub no_delay: bool,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub linkedin: LinkedinConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self::new("leadgen")
    }
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                sender_name: None,
            },
            database: DatabaseConfig {
                path: None,
                backup_before_run: true,
            },
            linkedin: LinkedinConfig::default(),
            email: EmailConfig::default(),
            pacing: PacingConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(LeadgenError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        Self::from_yaml(&data)
    }

    /// Parse YAML; missing sections and fields take their defaults.
    pub fn from_yaml(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn database_path(&self, root: &Path) -> PathBuf {
        paths::database_path(root, self.database.path.as_deref())
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.connection_limit_per_day {
            self.linkedin.connection_limit_per_day = v;
        }
        if let Some(v) = overrides.message_limit_per_day {
            self.linkedin.message_limit_per_day = v;
        }
        if let Some(v) = overrides.emails_per_day {
            self.email.emails_per_day = v;
        }
        if let Some(v) = overrides.follow_up_days {
            self.email.follow_up_days = v;
        }
        if let Some(v) = overrides.max_follow_ups {
            self.email.max_follow_ups = v;
        }
        if overrides.no_delay {
            self.pacing = PacingConfig::none();
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let quotas = [
            ("linkedin.connection_limit_per_day", self.linkedin.connection_limit_per_day),
            ("linkedin.message_limit_per_day", self.linkedin.message_limit_per_day),
            ("email.emails_per_day", self.email.emails_per_day),
            ("email.follow_up_days", self.email.follow_up_days),
            ("email.max_follow_ups", self.email.max_follow_ups),
        ];
        for (key, value) in quotas {
            if value == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{key} must be a positive integer"),
                });
            }
        }

        if self.linkedin.profile_finder_enabled && self.linkedin.profile_finder_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "linkedin.profile_finder_limit is 0; enrichment will do nothing"
                    .to_string(),
            });
        }

        if self.pacing.max_delay_secs < self.pacing.min_delay_secs {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "pacing.max_delay_secs ({}) is below pacing.min_delay_secs ({}); using the minimum",
                    self.pacing.max_delay_secs, self.pacing.min_delay_secs
                ),
            });
        }

        if !self.linkedin.enabled && !self.email.enabled {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "both outreach channels are disabled".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
