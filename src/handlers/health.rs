use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chamados::FiltroChamados;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::logging::*;
use crate::AppState;

const SERVICE_NAME: &str = "taskflow";

fn discord_status(state: &AppState) -> &'static str {
    match &state.discord {
        None => "disabled",
        Some(client) if client.is_ready() => "connected",
        Some(_) => "connecting",
    }
}

pub async fn health_check() -> Json<Value> {
    log_health_check();

    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Pronto quando o repositório de chamados responde; o Discord é opcional
pub async fn ready_check(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    log_health_check();

    let storage_status = match state.chamados().listar(&FiltroChamados::ativos()).await {
        Ok(_) => "available",
        Err(e) => {
            log_error(&format!("Repositório indisponível: {}", e));
            "unavailable"
        }
    };

    if storage_status != "available" {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(json!({
        "ready": true,
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "dependencies": {
            "storage": { "status": storage_status },
            "discord": { "status": discord_status(&state) }
        }
    })))
}

pub async fn status_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    log_health_check();

    let chamados = state.chamados().listar_todos().await.unwrap_or_default();
    let arquivados = chamados.iter().filter(|c| c.arquivado).count();
    let pendentes = state
        .usuarios
        .listar_pendentes()
        .await
        .map(|u| u.len())
        .unwrap_or(0);

    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
        "storage": {
            "persistent": state.settings.armazenamento.diretorio_dados.is_some(),
            "chamados_ativos": chamados.len() - arquivados,
            "chamados_arquivados": arquivados,
            "usuarios_pendentes": pendentes
        },
        "integrations": {
            "discord": {
                "configured": state.discord.is_some(),
                "status": discord_status(&state),
                "channel_id": state.settings.discord.canal_geral_id
            }
        }
    }))
}
