//! Shared input validation at the API boundary.

/// Validate a location name: 1-100 chars, no control characters.
///
/// Feed location names contain spaces and punctuation ("Subang Jaya",
/// "W.P. Kuala Lumpur"), so only length and control characters are checked.
pub fn validate_location_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 100 {
        return Err(format!(
            "Location name must be 1-100 characters, got {}",
            name.len()
        ));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err("Location name must not contain control characters".to_string());
    }
    Ok(())
}
