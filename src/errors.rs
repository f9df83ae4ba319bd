use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum LinkmeterError {
    BadFormat(String),
    Validation(String),
    Conflict(String),
    NotFound(String),
    CacheConnection(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Config(String),
    Internal(String),
}

impl LinkmeterError {
    /// Stable error code exposed in API responses
    pub fn code(&self) -> &'static str {
        match self {
            LinkmeterError::BadFormat(_) => "FIELD_BADFORMAT",
            LinkmeterError::Validation(_) => "FIELD_INCORRECT",
            LinkmeterError::Conflict(_) => "SHORT_ALREADY_EXISTS",
            LinkmeterError::NotFound(_) => "SHORT_NOT_FOUND",
            LinkmeterError::CacheConnection(_)
            | LinkmeterError::DatabaseConnection(_)
            | LinkmeterError::DatabaseOperation(_)
            | LinkmeterError::Config(_)
            | LinkmeterError::Internal(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            LinkmeterError::BadFormat(_) => "Bad Format",
            LinkmeterError::Validation(_) => "Validation Error",
            LinkmeterError::Conflict(_) => "Already Exists",
            LinkmeterError::NotFound(_) => "Resource Not Found",
            LinkmeterError::CacheConnection(_) => "Cache Connection Error",
            LinkmeterError::DatabaseConnection(_) => "Database Connection Error",
            LinkmeterError::DatabaseOperation(_) => "Database Operation Error",
            LinkmeterError::Config(_) => "Configuration Error",
            LinkmeterError::Internal(_) => "Internal Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LinkmeterError::BadFormat(msg)
            | LinkmeterError::Validation(msg)
            | LinkmeterError::Conflict(msg)
            | LinkmeterError::NotFound(msg)
            | LinkmeterError::CacheConnection(msg)
            | LinkmeterError::DatabaseConnection(msg)
            | LinkmeterError::DatabaseOperation(msg)
            | LinkmeterError::Config(msg)
            | LinkmeterError::Internal(msg) => msg,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            LinkmeterError::BadFormat(_) | LinkmeterError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            LinkmeterError::Conflict(_) => StatusCode::CONFLICT,
            LinkmeterError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether the error is caused by the caller's input.
    ///
    /// Everything else is a transient store/cache/internal failure whose
    /// detail must stay in the logs.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LinkmeterError::BadFormat(_)
                | LinkmeterError::Validation(_)
                | LinkmeterError::Conflict(_)
                | LinkmeterError::NotFound(_)
        )
    }

    /// Description that is safe to hand to API clients
    pub fn public_message(&self) -> &str {
        if self.is_client_error() {
            self.message()
        } else {
            "Service temporarily unavailable"
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkmeterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkmeterError {}

impl LinkmeterError {
    pub fn bad_format<T: Into<String>>(msg: T) -> Self {
        LinkmeterError::BadFormat(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkmeterError::Validation(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkmeterError::Conflict(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkmeterError::NotFound(msg.into())
    }

    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        LinkmeterError::CacheConnection(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkmeterError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkmeterError::DatabaseOperation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkmeterError::Config(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        LinkmeterError::Internal(msg.into())
    }
}

impl From<sea_orm::DbErr> for LinkmeterError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkmeterError::DatabaseOperation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkmeterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = LinkmeterError::validation("Custom alias must be 3-30 alphanumeric characters");
        assert_eq!(err.code(), "FIELD_INCORRECT");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.public_message(),
            "Custom alias must be 3-30 alphanumeric characters"
        );

        let err = LinkmeterError::conflict("taken");
        assert_eq!(err.code(), "SHORT_ALREADY_EXISTS");
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let err = LinkmeterError::not_found("nope");
        assert_eq!(err.code(), "SHORT_NOT_FOUND");
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_transient_errors_hide_detail() {
        let err = LinkmeterError::database_operation("connection reset by peer at 10.0.0.5");
        assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
        assert_eq!(err.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.public_message().contains("10.0.0.5"));
        assert!(err.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn test_server_side_variants_share_one_code() {
        let errors = [
            LinkmeterError::cache_connection("refused"),
            LinkmeterError::database_connection("refused"),
            LinkmeterError::database_operation("locked"),
            LinkmeterError::config("bad toml"),
            LinkmeterError::internal("exhausted"),
        ];
        for err in errors {
            assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
            assert_eq!(err.http_status(), StatusCode::SERVICE_UNAVAILABLE);
            assert!(!err.is_client_error());
        }
    }

    #[test]
    fn test_db_err_conversion() {
        let err: LinkmeterError = sea_orm::DbErr::Custom("boom".into()).into();
        assert!(matches!(err, LinkmeterError::DatabaseOperation(_)));
        assert!(err.message().contains("boom"));
    }
}
