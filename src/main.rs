//! Binário do TaskFlow
//!
//! - API HTTP (axum) para chamados, aprovações, analytics e agenda
//! - Ponte de notificações para o Discord em segundo plano (opcional)

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use chamados::RelogioSistema;
use taskflow::config::Settings;
use taskflow::utils::logging::*;
use taskflow::{criar_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 🔧 .env é opcional; em produção as variáveis vêm do ambiente
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    match dotenv {
        Ok(path) => log_info(&format!("✅ Arquivo .env carregado: {}", path.display())),
        Err(_) => tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema"),
    }

    let settings = Settings::new().context("Failed to load settings")?;
    log_config_loaded(&std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()));

    let state = Arc::new(
        AppState::montar(settings, Arc::new(RelogioSistema))
            .await
            .context("Failed to initialize application state")?,
    );

    let notificacoes = state.iniciar_notificacoes();

    // PORT tem precedência (Cloud Run e afins)
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(state.settings.server.port);
    let listener = TcpListener::bind(format!("{}:{}", state.settings.server.host, port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    log_server_startup(port);
    log_server_ready(port);

    let app = criar_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = notificacoes {
        handle.abort();
    }

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error(&format!("Falha ao instalar handler de Ctrl+C: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sinal) => {
                sinal.recv().await;
            }
            Err(e) => {
                log_error(&format!("Falha ao instalar handler de SIGTERM: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
