//! Engine configuration
//!
//! Loaded from a TOML file. A missing file yields the built-in defaults.

use disclosure_types::{ApplicationStatus, IncentivePolicy, IprType, Money};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub incentives: IncentiveConfig,
    pub suggestions: SuggestionConfig,
    pub events: EventConfig,
}

/// Fallback incentive policies, used only when the store has no record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IncentiveConfig {
    pub default_policies: Vec<PolicyDefault>,
}

/// One fallback policy entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDefault {
    pub ipr_type: IprType,
    /// Whole points
    pub base_points: u64,
    /// Whole rupees
    pub base_incentive: u64,
}

impl PolicyDefault {
    /// Built-in default for one IPR type
    pub fn builtin(ipr_type: IprType) -> Self {
        let (base_points, base_incentive) = match ipr_type {
            IprType::Patent => (50, 50_000),
            IprType::Copyright => (10, 10_000),
            IprType::Design => (20, 20_000),
            IprType::Trademark => (10, 10_000),
        };
        Self {
            ipr_type,
            base_points,
            base_incentive,
        }
    }

    pub fn to_policy(&self) -> IncentivePolicy {
        IncentivePolicy::new(
            self.ipr_type,
            self.base_points,
            Money::from_major(self.base_incentive),
        )
    }
}

impl Default for IncentiveConfig {
    fn default() -> Self {
        Self {
            default_policies: IprType::ALL.into_iter().map(PolicyDefault::builtin).collect(),
        }
    }
}

/// Where reviewers may propose field edits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub allowed_statuses: Vec<ApplicationStatus>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            allowed_statuses: vec![
                ApplicationStatus::Submitted,
                ApplicationStatus::UnderDrdReview,
                ApplicationStatus::Resubmitted,
                ApplicationStatus::RecommendedToHead,
                ApplicationStatus::DrdApproved,
                ApplicationStatus::UnderHeadReview,
                ApplicationStatus::PendingMentorApproval,
            ],
        }
    }
}

/// Event bus settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub channel_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `path`, or defaults when no file exists there
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.exists() => {
                let contents = std::fs::read_to_string(p)?;
                Self::from_toml_str(&contents)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Parse and validate an embedded TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.events.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "events.channel_capacity must be positive".into(),
            ));
        }
        for ipr_type in IprType::ALL {
            let entries = self
                .incentives
                .default_policies
                .iter()
                .filter(|p| p.ipr_type == ipr_type)
                .count();
            if entries > 1 {
                return Err(ConfigError::Invalid(format!(
                    "duplicate default policy for {ipr_type}"
                )));
            }
        }
        Ok(())
    }

    /// Fallback policy for `ipr_type`. Types the file omits use the built-in value.
    pub fn default_policy(&self, ipr_type: IprType) -> IncentivePolicy {
        self.incentives
            .default_policies
            .iter()
            .find(|p| p.ipr_type == ipr_type)
            .cloned()
            .unwrap_or_else(|| PolicyDefault::builtin(ipr_type))
            .to_policy()
    }

    pub fn allows_suggestions_in(&self, status: ApplicationStatus) -> bool {
        self.suggestions.allowed_statuses.contains(&status)
    }
}
