//! Business logic services for the Astral Insights backend

pub mod astrology_data;
pub mod daily_forecast;
pub mod onboarding;
pub mod timezone;

pub use astrology_data::AstrologyDataManager;
pub use daily_forecast::{DailyForecastService, FORECAST_CACHE_KEY};
pub use onboarding::{BirthDataSubmission, OnboardingService, SubmissionOutcome};
pub use timezone::{estimate_timezone_id, TimezoneResolver};
