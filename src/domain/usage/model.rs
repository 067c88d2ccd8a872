use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sentinel limit that never denies
pub const UNLIMITED: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
    Ultra,
}

impl PlanTier {
    pub fn limits(&self) -> LimitSet {
        match self {
            PlanTier::Free => LimitSet {
                messages: 50,
                images: 5,
                code_generations: 5,
            },
            PlanTier::Pro => LimitSet {
                messages: 500,
                images: 50,
                code_generations: 50,
            },
            PlanTier::Ultra => LimitSet {
                messages: UNLIMITED,
                images: UNLIMITED,
                code_generations: UNLIMITED,
            },
        }
    }

    /// Stored plan names outside the known tiers are treated as `free`
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(plan = %value, "Unknown plan tier, applying free limits");
            PlanTier::Free
        })
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanTier::Free => write!(f, "free"),
            PlanTier::Pro => write!(f, "pro"),
            PlanTier::Ultra => write!(f, "ultra"),
        }
    }
}

impl FromStr for PlanTier {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "ultra" => Ok(PlanTier::Ultra),
            _ => Err(ParseEnumError::new("plan tier", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitSet {
    pub messages: i32,
    pub images: i32,
    pub code_generations: i32,
}

impl LimitSet {
    pub fn for_resource(&self, resource: ResourceType) -> i32 {
        match resource {
            ResourceType::Message => self.messages,
            ResourceType::Image => self.images,
            ResourceType::Code => self.code_generations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Message,
    Image,
    Code,
}

impl ResourceType {
    /// Counter column in `usage_limits`
    pub fn column(&self) -> &'static str {
        match self {
            ResourceType::Message => "messages_used",
            ResourceType::Image => "images_used",
            ResourceType::Code => "code_generations_used",
        }
    }

    pub fn limit_message(&self) -> &'static str {
        match self {
            ResourceType::Message => "Message limit exceeded. Please upgrade your plan.",
            ResourceType::Image => "Image generation limit exceeded. Please upgrade your plan.",
            ResourceType::Code => "Code generation limit exceeded. Please upgrade your plan.",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Message => write!(f, "message"),
            ResourceType::Image => write!(f, "image"),
            ResourceType::Code => write!(f, "code"),
        }
    }
}

impl FromStr for ResourceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(ResourceType::Message),
            "image" => Ok(ResourceType::Image),
            "code" => Ok(ResourceType::Code),
            _ => Err(ParseEnumError::new("resource type", s)),
        }
    }
}

/// Counters for the current accounting period. An absent row reads as zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub messages_used: i32,
    pub images_used: i32,
    pub code_generations_used: i32,
}

impl UsageRecord {
    pub fn used(&self, resource: ResourceType) -> i32 {
        match resource {
            ResourceType::Message => self.messages_used,
            ResourceType::Image => self.images_used,
            ResourceType::Code => self.code_generations_used,
        }
    }
}

/// How often counters start over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPeriod {
    Never,
    Daily,
    #[default]
    Monthly,
}

impl ResetPeriod {
    /// First day of the period containing `now`
    pub fn period_start(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = now.date_naive();
        match self {
            ResetPeriod::Never => NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(today),
            ResetPeriod::Daily => today,
            ResetPeriod::Monthly => today.with_day(1).unwrap_or(today),
        }
    }
}

impl FromStr for ResetPeriod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(ResetPeriod::Never),
            "daily" => Ok(ResetPeriod::Daily),
            "monthly" => Ok(ResetPeriod::Monthly),
            _ => Err(ParseEnumError::new("reset period", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Outcome of a single check-and-increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Counter was incremented; `used` is the new value
    Allowed { used: i32, limit: i32 },
    /// Nothing was written
    Denied { used: i32, limit: i32 },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub plan: PlanTier,
    pub limits: LimitSet,
    pub usage: UsageRecord,
}
