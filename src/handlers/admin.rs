use axum::{extract::State, response::Json};
use chamados::RelatorioMigracao;
use std::sync::Arc;

use crate::utils::logging::*;
use crate::utils::AppResult;
use crate::AppState;

/// Autor registrado no histórico das migrações administrativas
const AUTOR_MIGRACAO: &str = "sistema";

/// Converte `tempoGastoHorasLegado` em segundos (idempotente)
pub async fn migrar_tempo_legado(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<RelatorioMigracao>> {
    log_request_received("/admin/migracoes/tempo-legado", "POST");
    let relatorio = state.ciclo.migrar_tempo_legado(AUTOR_MIGRACAO).await?;
    log_migracao_concluida(relatorio.chamados_convertidos);
    Ok(Json(relatorio))
}
