//! Validation utilities for onboarding input.
//!
//! These check structural validity only. Calendar correctness of the birth
//! date and time is decided later, when the timezone-aware instant is built.

/// Validate a required free-text field is not blank.
pub fn validate_required_text(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("This field is required");
    }
    Ok(())
}

/// Validate a latitude in decimal degrees.
pub fn validate_latitude(latitude: f64) -> Result<(), &'static str> {
    if !latitude.is_finite() {
        return Err("Latitude must be a finite number");
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90 degrees");
    }
    Ok(())
}

/// Validate a longitude in decimal degrees.
pub fn validate_longitude(longitude: f64) -> Result<(), &'static str> {
    if !longitude.is_finite() {
        return Err("Longitude must be a finite number");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180 degrees");
    }
    Ok(())
}

/// Validate a birth date string has the expected `YYYY-MM-DD` shape.
///
/// Shape only: month and day digit counts are checked, not calendar
/// validity, so `2000-02-30` passes here and fails later at instant
/// construction.
pub fn validate_date_shape(date: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 3
        || parts[0].len() != 4
        || parts[1].len() != 2
        || parts[2].len() != 2
        || parts.iter().any(|p| !p.chars().all(|c| c.is_ascii_digit()))
    {
        return Err("Date must be in YYYY-MM-DD format");
    }
    Ok(())
}

/// Validate a birth time string has the expected `HH:MM` shape.
pub fn validate_time_shape(time: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 2
        || parts[0].len() != 2
        || parts[1].len() != 2
        || parts.iter().any(|p| !p.chars().all(|c| c.is_ascii_digit()))
    {
        return Err("Time must be in HH:MM format");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Ada Lovelace").is_ok());
        assert!(validate_required_text("").is_err());
        assert!(validate_required_text("   ").is_err());
        assert!(validate_required_text("\t\n").is_err());
    }

    #[test]
    fn test_latitude_range() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.001).is_err());
        assert!(validate_latitude(-90.001).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
    }

    #[test]
    fn test_longitude_range() {
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.5).is_err());
        assert!(validate_longitude(f64::INFINITY).is_err());
    }

    #[test]
    fn test_date_shape() {
        assert!(validate_date_shape("1990-06-15").is_ok());
        // Calendar validity is deliberately not checked here
        assert!(validate_date_shape("2000-02-30").is_ok());
        assert!(validate_date_shape("1990-6-15").is_err());
        assert!(validate_date_shape("15/06/1990").is_err());
        assert!(validate_date_shape("").is_err());
    }

    #[test]
    fn test_time_shape() {
        assert!(validate_time_shape("08:30").is_ok());
        assert!(validate_time_shape("23:59").is_ok());
        assert!(validate_time_shape("8:30").is_err());
        assert!(validate_time_shape("08:30:00").is_err());
        assert!(validate_time_shape("").is_err());
    }
}
