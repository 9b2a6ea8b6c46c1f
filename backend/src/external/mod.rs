//! External API integrations

pub mod forecast;
pub mod timezone;

pub use forecast::{ForecastApi, ForecastApiResponse, HttpForecastClient};
pub use timezone::{HttpTimezoneClient, TimezoneApi, TimezoneLookup};
