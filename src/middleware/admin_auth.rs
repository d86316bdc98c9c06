/// Middleware de autenticação para endpoints administrativos
///
/// Valida que a requisição contém a chave configurada em `admin.api_key`
/// (ou `ADMIN_API_KEY`) no header X-Admin-Key. Protege as migrações de dados.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

/// Middleware que requer a chave administrativa nos endpoints /admin/*
///
/// # Uso na requisição
///
/// ```bash
/// curl -X POST -H "X-Admin-Key: $ADMIN_API_KEY" \
///   http://localhost:8080/admin/migracoes/tempo-legado
/// ```
///
/// # Respostas
///
/// - Chave correta: continua para o handler
/// - **401 Unauthorized**: chave ausente ou inválida
/// - Sem chave configurada: liberado em desenvolvimento (warning no log),
///   **503** em produção (`RUST_ENV=production`)
pub async fn require_admin_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let provided_key = request
        .headers()
        .get("X-Admin-Key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let expected_key = state
        .settings
        .admin
        .api_key
        .clone()
        .filter(|k| !k.is_empty());

    let is_production = std::env::var("RUST_ENV")
        .unwrap_or_else(|_| "development".to_string())
        == "production";

    match (expected_key, provided_key, is_production) {
        (Some(expected), Some(provided), _) if expected == provided => {
            tracing::debug!("✅ Admin access granted");
            Ok(next.run(request).await)
        }

        (Some(_), provided, _) => {
            tracing::warn!(
                "❌ Admin access denied - Invalid or missing X-Admin-Key: {:?}",
                provided.map(|_| "<redacted>")
            );
            Err(unauthorized_response())
        }

        (None, _, false) => {
            tracing::warn!(
                "⚠️  ADMIN_API_KEY not configured - Allowing access in development mode"
            );
            Ok(next.run(request).await)
        }

        (None, _, true) => {
            tracing::error!("🚨 ADMIN_API_KEY not configured in production! Blocking admin access.");
            Err(service_unavailable_response())
        }
    }
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "Missing or invalid X-Admin-Key header",
            "status": 401
        })),
    )
        .into_response()
}

fn service_unavailable_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": "ADMIN_API_KEY not configured on server",
            "status": 503
        })),
    )
        .into_response()
}
