//! Agenda mensal compartilhada

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chamados::AgendaTarefa;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::middleware::UsuarioAutenticado;
use crate::utils::AppResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MesQuery {
    /// `AAAA-MM`; padrão é o mês corrente
    #[serde(default)]
    pub mes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NovaTarefaBody {
    #[serde(default)]
    pub titulo: String,
    pub data: NaiveDate,
}

pub async fn listar_agenda(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MesQuery>,
) -> AppResult<Json<Vec<AgendaTarefa>>> {
    let mes = query
        .mes
        .unwrap_or_else(|| state.relogio.agora().format("%Y-%m").to_string());
    Ok(Json(state.agenda.listar_mes(&mes).await?))
}

pub async fn criar_tarefa(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Json(body): Json<NovaTarefaBody>,
) -> AppResult<(StatusCode, Json<AgendaTarefa>)> {
    let tarefa = state.agenda.criar(&usuario, &body.titulo, body.data).await?;
    Ok((StatusCode::CREATED, Json(tarefa)))
}

/// Marca ou desmarca a tarefa como concluída
pub async fn alternar_tarefa(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> AppResult<Json<AgendaTarefa>> {
    Ok(Json(state.agenda.alternar_concluida(&id, &usuario).await?))
}

pub async fn alternar_timer_tarefa(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> AppResult<Json<AgendaTarefa>> {
    Ok(Json(state.agenda.alternar_timer(&id, &usuario).await?))
}

pub async fn remover_tarefa(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.agenda.remover(&id, &usuario).await?;
    Ok(StatusCode::NO_CONTENT)
}
