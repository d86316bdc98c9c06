use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chamados::ChamadoError;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    PermissionError(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    StorageError(String),
    ConfigError(String),
    JsonError(serde_json::Error),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::PermissionError(msg) => write!(f, "Permission denied: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::JsonError(err) => write!(f, "JSON error: {}", err),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonError(err)
    }
}

impl From<ChamadoError> for AppError {
    fn from(err: ChamadoError) -> Self {
        match err {
            ChamadoError::Validacao(msg) => AppError::ValidationError(msg),
            ChamadoError::Permissao(msg) => AppError::PermissionError(msg),
            ChamadoError::NaoEncontrado(msg) => AppError::NotFound(msg),
            transicao @ ChamadoError::TransicaoInvalida { .. } => {
                AppError::Conflict(transicao.to_string())
            }
            ChamadoError::Armazenamento(msg) => AppError::StorageError(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PermissionError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::StorageError(msg) => {
                tracing::error!("💾 Falha de armazenamento: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Não foi possível salvar a alteração. Tente novamente.".to_string(),
                )
            }
            AppError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::JsonError(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = json!({
            "error": error_message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
