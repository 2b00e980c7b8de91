use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("datastore error: {0}")]
    Db(#[from] opsboard_db::DbError),
    #[error("source error: {0}")]
    Source(#[from] sources::SourceError),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
}

impl AppError {
    fn status(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::Db(_) | AppError::Source(_) => 500,
        }
    }

    fn code(&self) -> Option<&'static str> {
        match self {
            AppError::InvalidInput(_) => Some("invalid_input"),
            AppError::NotFound(_) => Some("not_found"),
            AppError::Db(_) | AppError::Source(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Wire shape for error responses; `status` doubles as the HTTP status.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
            code: err.code().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_and_lookup_failures_map_to_client_statuses() {
        let invalid = ApiError::from(AppError::InvalidInput("task is required".into()));
        assert_eq!(invalid.status, 400);
        assert_eq!(invalid.code.as_deref(), Some("invalid_input"));

        let missing = ApiError::from(AppError::NotFound("mission 7 not found".into()));
        assert_eq!(missing.status, 404);
        assert_eq!(missing.message, "mission 7 not found");
    }
}
