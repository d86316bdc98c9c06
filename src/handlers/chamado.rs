//! Rotas de chamados: dashboard, detalhes, ciclo de vida e arquivo

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
    Extension,
};
use chamados::permissoes::{self, AcoesDisponiveis};
use chamados::{Chamado, FiltroChamados, NovoChamado, StatusChamado, Usuario};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::middleware::UsuarioAutenticado;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;

/// Filtros do dashboard (`?status=Aberto,Em Andamento&executor=uid`)
#[derive(Debug, Default, Deserialize)]
pub struct FiltroQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub executor: Option<String>,
}

impl FiltroQuery {
    fn para_filtro(&self) -> AppResult<FiltroChamados> {
        let mut filtro = FiltroChamados::ativos();
        if let Some(lista) = self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            let status = lista
                .split(',')
                .map(|s| s.parse::<StatusChamado>().map_err(AppError::ValidationError))
                .collect::<AppResult<Vec<_>>>()?;
            filtro = filtro.com_status(status);
        }
        if let Some(executor) = self.executor.as_deref().filter(|e| !e.is_empty()) {
            filtro = filtro.com_executor(executor);
        }
        Ok(filtro)
    }
}

/// Cartão do dashboard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamadoResumo {
    #[serde(flatten)]
    pub chamado: Chamado,
    pub pode_agir: bool,
    pub acao_sugerida: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetalhesChamado {
    pub chamado: Chamado,
    pub acoes: AcoesDisponiveis,
    pub pode_agir: bool,
    pub acao_sugerida: Option<&'static str>,
}

fn resumir(chamados: Vec<Chamado>, usuario: &Usuario) -> Vec<ChamadoResumo> {
    chamados
        .into_iter()
        .map(|chamado| ChamadoResumo {
            pode_agir: permissoes::pode_agir(usuario.perfil, &chamado, &usuario.uid),
            acao_sugerida: permissoes::acao_sugerida(usuario.perfil, &chamado, &usuario.uid),
            chamado,
        })
        .collect()
}

pub async fn listar_chamados(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Query(query): Query<FiltroQuery>,
) -> AppResult<Json<Vec<ChamadoResumo>>> {
    let filtro = query.para_filtro()?;
    let chamados = state.chamados().listar(&filtro).await?;
    Ok(Json(resumir(chamados, &usuario)))
}

/// Push em tempo real do conjunto filtrado (Server-Sent Events)
///
/// O primeiro evento traz o estado atual; os seguintes, cada mudança.
/// Fechar a conexão cancela a assinatura.
pub async fn stream_chamados(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Query(query): Query<FiltroQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let filtro = query.para_filtro()?;
    let assinatura = state.chamados().assinar(filtro).await?;
    tracing::debug!("📡 Stream de chamados aberto para {}", usuario.uid);

    let eventos = stream::unfold((assinatura, true), move |(mut assinatura, primeiro)| {
        let usuario = usuario.clone();
        async move {
            let chamados = if primeiro {
                assinatura.atual()
            } else {
                assinatura.proxima().await?
            };
            let evento = Event::default()
                .event("chamados")
                .json_data(resumir(chamados, &usuario));
            Some((evento, (assinatura, false)))
        }
    });

    Ok(Sse::new(eventos).keep_alive(KeepAlive::default()))
}

pub async fn criar_chamado(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Json(novo): Json<NovoChamado>,
) -> AppResult<(StatusCode, Json<Chamado>)> {
    let chamado = state.ciclo.criar(&usuario, novo).await?;
    log_chamado_criado(&chamado.id, &chamado.titulo);
    Ok((StatusCode::CREATED, Json(chamado)))
}

pub async fn detalhes_chamado(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> AppResult<Json<DetalhesChamado>> {
    let chamado = state.chamados().obter(&id).await?;
    Ok(Json(DetalhesChamado {
        acoes: AcoesDisponiveis::calcular(&usuario, &chamado),
        pode_agir: permissoes::pode_agir(usuario.perfil, &chamado, &usuario.uid),
        acao_sugerida: permissoes::acao_sugerida(usuario.perfil, &chamado, &usuario.uid),
        chamado,
    }))
}

pub async fn assumir_chamado(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> AppResult<Json<Chamado>> {
    let chamado = state.ciclo.assumir(&id, &usuario).await?;
    log_transicao(&id, "assumido", &usuario.uid);
    Ok(Json(chamado))
}

/// Pausa ou retoma o cronômetro do próprio usuário
pub async fn alternar_timer(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> AppResult<Json<Chamado>> {
    Ok(Json(state.ciclo.alternar_timer(&id, &usuario).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolverBody {
    #[serde(default)]
    pub notas: String,
}

pub async fn resolver_chamado(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
    Json(body): Json<ResolverBody>,
) -> AppResult<Json<Chamado>> {
    let chamado = state.ciclo.resolver(&id, &usuario, &body.notas).await?;
    log_transicao(&id, "resolvido", &usuario.uid);
    Ok(Json(chamado))
}

#[derive(Debug, Default, Deserialize)]
pub struct JustificativaBody {
    #[serde(default)]
    pub justificativa: Option<String>,
}

/// Aprovação; a justificativa é opcional (corpo pode ser omitido)
pub async fn aprovar_chamado(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
    body: Option<Json<JustificativaBody>>,
) -> AppResult<Json<Chamado>> {
    let justificativa = body.and_then(|Json(b)| b.justificativa);
    let chamado = state
        .ciclo
        .aprovar(&id, &usuario, justificativa.as_deref())
        .await?;
    log_transicao(&id, "aprovado", &usuario.uid);
    Ok(Json(chamado))
}

pub async fn recusar_chamado(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
    Json(body): Json<JustificativaBody>,
) -> AppResult<Json<Chamado>> {
    let justificativa = body.justificativa.unwrap_or_default();
    let chamado = state.ciclo.recusar(&id, &usuario, &justificativa).await?;
    log_transicao(&id, "recusado", &usuario.uid);
    Ok(Json(chamado))
}

pub async fn arquivar_chamado(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> AppResult<Json<Chamado>> {
    Ok(Json(state.ciclo.arquivar(&id, &usuario).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutoresBody {
    #[serde(default)]
    pub executor_ids: Vec<String>,
}

pub async fn definir_executores(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
    Json(body): Json<ExecutoresBody>,
) -> AppResult<Json<Chamado>> {
    let mut executores = Vec::with_capacity(body.executor_ids.len());
    for uid in &body.executor_ids {
        let perfil = state
            .usuarios
            .obter(uid)
            .await?
            .ok_or_else(|| AppError::ValidationError(format!("Usuário {} não existe", uid)))?;
        executores.push(perfil);
    }
    let chamado = state
        .ciclo
        .definir_executores(&id, &usuario, &executores)
        .await?;
    log_transicao(&id, "responsáveis atualizados", &usuario.uid);
    Ok(Json(chamado))
}

#[derive(Debug, Deserialize)]
pub struct ComentarioBody {
    #[serde(default)]
    pub texto: String,
}

pub async fn comentar_chamado(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
    Json(body): Json<ComentarioBody>,
) -> AppResult<(StatusCode, Json<Chamado>)> {
    let chamado = state.ciclo.comentar(&id, &usuario, &body.texto).await?;
    Ok((StatusCode::CREATED, Json(chamado)))
}

/// Chamados arquivados, mais recentes primeiro
pub async fn listar_arquivados(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<Chamado>>> {
    Ok(Json(state.chamados().listar(&FiltroChamados::arquivados()).await?))
}
