//! Batch identifier validation and route extraction

use crate::constants::PROCESSED_ROUTE_SEGMENT;
use crate::error::ClientError;

/// Validate a batch id
///
/// Rules:
/// - Must be non-empty after trimming surrounding whitespace
///
/// Returns the trimmed id.
pub fn validate_batch_id(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidBatchId(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Extract the batch id embedded in a location such as `/processed/<id>` or
/// `#/processed/<id>`. Returns `None` for the bare `/processed` route.
pub fn route_batch_id(location: &str) -> Option<String> {
    let path = location
        .trim_start_matches('#')
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    segments.find(|s| *s == PROCESSED_ROUTE_SEGMENT)?;
    let raw = segments.next()?;

    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    if decoded.trim().is_empty() {
        None
    } else {
        Some(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        assert!(matches!(
            validate_batch_id(""),
            Err(ClientError::InvalidBatchId(_))
        ));
        assert!(validate_batch_id("   \t").is_err());
    }

    #[test]
    fn ids_are_trimmed() {
        assert_eq!(validate_batch_id("  abc-123 ").unwrap(), "abc-123");
    }

    #[test]
    fn route_extraction() {
        assert_eq!(
            route_batch_id("/processed/abc-123"),
            Some("abc-123".to_string())
        );
        assert_eq!(
            route_batch_id("#/processed/abc-123?x=1"),
            Some("abc-123".to_string())
        );
        assert_eq!(
            route_batch_id("/processed/a%20b/"),
            Some("a b".to_string())
        );
        assert_eq!(route_batch_id("/processed"), None);
        assert_eq!(route_batch_id("/processed/"), None);
        assert_eq!(route_batch_id("/upload"), None);
    }
}
