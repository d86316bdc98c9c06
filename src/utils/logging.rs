use tracing::{debug, info, warn, error};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_chamado_criado(id: &str, titulo: &str) {
    info!("🎫 Chamado criado: {} - Título: {}", id, titulo);
}

pub fn log_transicao(id: &str, acao: &str, autor: &str) {
    info!("🔄 Chamado {}: {} (por {})", id, acao, autor);
}

pub fn log_sessao_iniciada(uid: &str) {
    info!("🔑 Sessão iniciada para {}", uid);
}

pub fn log_acesso_negado(uid: &str, motivo: &str) {
    warn!("🚫 Acesso negado para {}: {}", uid, motivo);
}

pub fn log_acesso_atualizado(uid: &str, acesso: &str) {
    info!("👤 Acesso de {} atualizado para {}", uid, acesso);
}

pub fn log_migracao_concluida(convertidos: usize) {
    info!("🧮 Migração de tempo legado concluída: {} chamados convertidos", convertidos);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(port: u16) {
    info!("🚀 TaskFlow server starting on port {}", port);
}

pub fn log_server_ready(port: u16) {
    info!("✅ Server ready and listening on http://0.0.0.0:{}", port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
