use axum::{
    extract::{Query, State},
    response::Json,
    Extension,
};
use chamados::analytics::{self, MetricasAnalytics, Periodo};
use serde::Deserialize;
use std::sync::Arc;

use super::exigir_gestor;
use crate::middleware::UsuarioAutenticado;
use crate::utils::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub periodo: Option<String>,
}

/// Métricas do período (`all`, `year`, `month` ou `week`)
pub async fn obter_analytics(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<MetricasAnalytics>> {
    exigir_gestor(&usuario)?;
    let periodo = match query.periodo.as_deref() {
        Some(p) => p.parse::<Periodo>().map_err(AppError::ValidationError)?,
        None => Periodo::default(),
    };

    let chamados = state.chamados().listar_todos().await?;
    let usuarios = state.usuarios.listar_todos().await?;
    Ok(Json(analytics::calcular(
        &chamados,
        &usuarios,
        periodo,
        state.relogio.agora(),
    )))
}
