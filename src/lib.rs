// Biblioteca do serviço TaskFlow
// Expõe módulos e o router para uso no binário e nos testes

pub mod auth;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod utils;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};
use chamados::{
    ChamadoRepository, CicloChamados, MemoriaAgenda, MemoriaChamados, Relogio, ServicoAgenda,
};
use discord::DiscordClient;
use mensageria::{CanalDiscord, PonteNotificacoes};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use auth::{AutenticacaoMemoria, DiretorioPerfis, MemoriaUsuarios, ProvedorAutenticacao, UsuarioRepository};
use config::Settings;
use handlers::*;
use utils::logging::*;
use utils::{AppError, AppResult};

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub ciclo: CicloChamados,
    pub usuarios: Arc<dyn UsuarioRepository>,
    pub autenticacao: Arc<dyn ProvedorAutenticacao>,
    pub agenda: ServicoAgenda,
    pub relogio: Arc<dyn Relogio>,
    /// Presente apenas com `DISCORD_TOKEN` configurado
    pub discord: Option<DiscordClient>,
}

impl AppState {
    /// Monta os repositórios (em arquivo se `armazenamento.diretorio_dados`
    /// estiver definido), o gestor inicial e o cliente do Discord
    pub async fn montar(settings: Settings, relogio: Arc<dyn Relogio>) -> AppResult<Self> {
        let ttl = settings.auth.sessao_ttl_horas;

        let (chamados, usuarios, autenticacao, agenda) = match &settings.armazenamento.diretorio_dados {
            Some(dir) => {
                let dir = Path::new(dir);
                log_info(&format!("💾 Persistência em {}", dir.display()));
                let chamados = MemoriaChamados::abrir(relogio.clone(), dir.join("chamados.json")).await?;
                let usuarios: Arc<dyn UsuarioRepository> =
                    Arc::new(MemoriaUsuarios::abrir(dir.join("usuarios.json")).await?);
                let autenticacao = AutenticacaoMemoria::abrir(
                    usuarios.clone(),
                    relogio.clone(),
                    ttl,
                    dir.join("contas.json"),
                )
                .await?;
                let agenda = MemoriaAgenda::abrir(dir.join("agenda.json")).await?;
                (chamados, usuarios, autenticacao, agenda)
            }
            None => {
                log_warning("⚠️  Sem diretório de dados: tudo fica somente em memória");
                let usuarios: Arc<dyn UsuarioRepository> = Arc::new(MemoriaUsuarios::new());
                let autenticacao = AutenticacaoMemoria::new(usuarios.clone(), relogio.clone(), ttl);
                (MemoriaChamados::new(relogio.clone()), usuarios, autenticacao, MemoriaAgenda::new())
            }
        };

        if let Some(bootstrap) = &settings.bootstrap {
            autenticacao
                .registrar_gestor(&bootstrap.gestor_nome, &bootstrap.gestor_email, &bootstrap.gestor_senha)
                .await?;
        }

        let discord = match settings.discord.token_configurado() {
            Some(token) => {
                let client = DiscordClient::new(token)
                    .map_err(|e| AppError::ConfigError(e.to_string()))?;
                Some(match &settings.discord.base_url {
                    Some(url) => client.with_base_url(url.as_str()),
                    None => client,
                })
            }
            None => None,
        };

        let chamados: Arc<dyn ChamadoRepository> = Arc::new(chamados);
        Ok(Self {
            ciclo: CicloChamados::new(chamados, relogio.clone()),
            usuarios,
            autenticacao: Arc::new(autenticacao),
            agenda: ServicoAgenda::new(Arc::new(agenda), relogio.clone()),
            relogio,
            discord,
            settings,
        })
    }

    pub fn chamados(&self) -> &Arc<dyn ChamadoRepository> {
        self.ciclo.repositorio()
    }

    /// Inicia a ponte de notificações, se o Discord estiver configurado
    pub fn iniciar_notificacoes(&self) -> Option<JoinHandle<()>> {
        let Some(client) = self.discord.clone() else {
            log_warning("⚠️  DISCORD_TOKEN não configurado: notificações desativadas");
            return None;
        };

        let conexao = client.clone();
        tokio::spawn(async move {
            if let Err(e) = conexao.ensure_connected().await {
                log_error(&format!("❌ Falha no login do bot do Discord: {}", e));
            }
        });

        let canal = Arc::new(CanalDiscord::new(client, self.settings.discord.canal_geral_id.clone()));
        let diretorio = Arc::new(DiretorioPerfis::new(self.usuarios.clone()));
        Some(PonteNotificacoes::new(canal, diretorio).iniciar(self.chamados().eventos()))
    }
}

/// Monta o router com todas as rotas
pub fn criar_router(state: Arc<AppState>) -> Router {
    // Health checks e entrada (públicos)
    let publicas = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/status", get(status_check))
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup));

    // Qualquer sessão válida, inclusive cadastros pendentes
    let sessao = Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route_layer(from_fn_with_state(state.clone(), middleware::exigir_sessao));

    let protegidas = Router::new()
        .route("/chamados", get(listar_chamados).post(criar_chamado))
        .route("/chamados/stream", get(stream_chamados))
        .route("/chamados/:id", get(detalhes_chamado))
        .route("/chamados/:id/assumir", post(assumir_chamado))
        .route("/chamados/:id/timer", post(alternar_timer))
        .route("/chamados/:id/resolver", post(resolver_chamado))
        .route("/chamados/:id/aprovar", post(aprovar_chamado))
        .route("/chamados/:id/recusar", post(recusar_chamado))
        .route("/chamados/:id/arquivar", post(arquivar_chamado))
        .route("/chamados/:id/executores", put(definir_executores))
        .route("/chamados/:id/comentarios", post(comentar_chamado))
        .route("/arquivados", get(listar_arquivados))
        .route("/aprovacoes", get(listar_aprovacoes))
        .route("/aprovacoes/:uid", post(decidir_aprovacao))
        .route("/usuarios/atribuiveis", get(listar_atribuiveis))
        .route("/analytics", get(obter_analytics))
        .route("/agenda", get(listar_agenda).post(criar_tarefa))
        .route("/agenda/:id", patch(alternar_tarefa).delete(remover_tarefa))
        .route("/agenda/:id/timer", post(alternar_timer_tarefa))
        .route_layer(from_fn_with_state(state.clone(), middleware::exigir_acesso_aprovado));

    // ✅ Rotas administrativas protegidas com API key
    let admin = Router::new()
        .route("/admin/migracoes/tempo-legado", post(migrar_tempo_legado))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin_key));

    publicas
        .merge(sessao)
        .merge(protegidas)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
