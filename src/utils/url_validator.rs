//! Target URL validation
//!
//! Only absolute http(s) URLs with a host are accepted as redirect targets.

use url::Url;

#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidScheme(String),
    MissingHost,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidScheme(scheme) => write!(
                f,
                "Invalid scheme: {}. Only http:// and https:// are allowed",
                scheme
            ),
            Self::MissingHost => write!(f, "URL must contain a host"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// Parse and check a redirect target.
///
/// Returns the trimmed input on success so callers store exactly what they
/// validated.
pub fn validate_url(raw: &str) -> Result<&str, UrlValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let parsed = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidScheme(other.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert_eq!(validate_url("https://example.com"), Ok("https://example.com"));
        assert!(validate_url("http://localhost:8080/a?b=1").is_ok());
        assert_eq!(validate_url("  https://example.com/x  "), Ok("https://example.com/x"));
        assert!(validate_url("HTTPS://EXAMPLE.COM").is_ok());
    }

    #[test]
    fn test_rejected_urls() {
        assert_eq!(validate_url(""), Err(UrlValidationError::EmptyUrl));
        assert_eq!(validate_url("   "), Err(UrlValidationError::EmptyUrl));
        assert!(matches!(
            validate_url("javascript:alert(1)"),
            Err(UrlValidationError::InvalidScheme(_))
        ));
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(UrlValidationError::InvalidScheme(_))
        ));
        assert!(matches!(
            validate_url("example.com"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }
}
