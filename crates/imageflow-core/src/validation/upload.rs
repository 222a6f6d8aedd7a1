//! Upload form validation
//!
//! Only presence rules are enforced here. Numeric ranges (rotate, crop, resize) are
//! deliberately left to the backend.

use validator::ValidateEmail;

use crate::error::ClientError;
use crate::models::ImageEditMetadata;

/// Validate the notification email address
pub fn validate_email(email: &str) -> Result<(), ClientError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ClientError::InvalidInput("Email is required".to_string()));
    }
    if !email.validate_email() {
        return Err(ClientError::InvalidInput(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}

/// Positions of the images that have no applied filter
pub fn missing_filters(metadata: &[ImageEditMetadata]) -> Vec<usize> {
    metadata
        .iter()
        .enumerate()
        .filter(|(_, meta)| !meta.has_applied_filters())
        .map(|(index, _)| index)
        .collect()
}

/// Validate a selection: at least one image, and every image has an applied filter
pub fn validate_selection(metadata: &[ImageEditMetadata]) -> Result<(), ClientError> {
    if metadata.is_empty() {
        return Err(ClientError::InvalidInput(
            "Select at least one image".to_string(),
        ));
    }

    let indices = missing_filters(metadata);
    if !indices.is_empty() {
        return Err(ClientError::MissingFilters { indices });
    }

    Ok(())
}
