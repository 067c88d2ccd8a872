pub mod dto;
pub mod error;
pub mod model;
pub mod service;

pub use dto::{TrackUsageRequest, TrackUsageResponse, UsageLimitsQuery};
pub use error::UsageServiceError;
pub use model::{
    LimitSet, ParseEnumError, PlanTier, Reservation, ResetPeriod, ResourceType, UsageRecord,
    UsageSnapshot, UNLIMITED,
};
pub use service::{parse_resource, parse_user_id, UsageService};
