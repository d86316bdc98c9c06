//! Regras de elegibilidade por perfil e status
//!
//! - `pode_agir` e `acao_sugerida`: destaque dos cards do dashboard
//! - `verificar_*`: guardas de cada ação do ciclo de vida. O controlador as
//!   executa antes de montar a atualização e o repositório as repete, via
//!   `Regra`, sobre o registro travado. `AcoesDisponiveis` é derivado delas.

use serde::Serialize;

use crate::error::{ChamadoError, Result};
use crate::types::{Chamado, Perfil, StatusChamado, Usuario};

/// O usuário pode agir sobre o chamado no dashboard?
///
/// Não arquivado e:
/// - Gestor com o chamado Aberto ou Resolvido; ou
/// - Executor com o chamado Aberto, ou Em Andamento sendo responsável.
pub fn pode_agir(perfil: Perfil, chamado: &Chamado, usuario_id: &str) -> bool {
    if chamado.arquivado {
        return false;
    }
    match perfil {
        Perfil::Gestor => matches!(
            chamado.status,
            StatusChamado::Aberto | StatusChamado::Resolvido
        ),
        Perfil::Executor => {
            chamado.status == StatusChamado::Aberto
                || (chamado.status == StatusChamado::EmAndamento && chamado.is_executor(usuario_id))
        }
    }
}

/// Rótulo do botão de ação do card
pub fn acao_sugerida(perfil: Perfil, chamado: &Chamado, usuario_id: &str) -> Option<&'static str> {
    if chamado.arquivado {
        return None;
    }
    match chamado.status {
        StatusChamado::Resolvido if perfil == Perfil::Gestor => Some("Revisar"),
        StatusChamado::Aberto => Some("Assumir"),
        StatusChamado::EmAndamento if chamado.is_executor(usuario_id) => Some("Resolver"),
        _ => None,
    }
}

fn verificar_nao_arquivado(chamado: &Chamado) -> Result<()> {
    if chamado.arquivado {
        return Err(ChamadoError::Permissao(
            "Este chamado está arquivado e serve apenas para consulta".to_string(),
        ));
    }
    Ok(())
}

fn verificar_gestor(usuario: &Usuario, acao: &str) -> Result<()> {
    if !usuario.is_gestor() {
        return Err(ChamadoError::Permissao(format!(
            "Apenas gestores podem {}",
            acao
        )));
    }
    Ok(())
}

fn verificar_responsavel(usuario: &Usuario, chamado: &Chamado) -> Result<()> {
    if !chamado.is_executor(&usuario.uid) {
        return Err(ChamadoError::Permissao(
            "Você não é responsável por este chamado".to_string(),
        ));
    }
    Ok(())
}

fn verificar_status(chamado: &Chamado, acao: &str, permitidos: &[StatusChamado]) -> Result<()> {
    if !permitidos.contains(&chamado.status) {
        return Err(ChamadoError::TransicaoInvalida {
            acao: acao.to_string(),
            status: chamado.status,
        });
    }
    Ok(())
}

const EM_TRABALHO: [StatusChamado; 3] = [
    StatusChamado::Aberto,
    StatusChamado::EmAndamento,
    StatusChamado::Pausado,
];

pub fn verificar_criar(usuario: &Usuario) -> Result<()> {
    verificar_gestor(usuario, "abrir chamados")
}

/// Juntar-se ao chamado e iniciar o trabalho
pub fn verificar_assumir(_usuario: &Usuario, chamado: &Chamado) -> Result<()> {
    verificar_nao_arquivado(chamado)?;
    // Executor e Gestor podem assumir
    verificar_status(chamado, "join", &EM_TRABALHO)
}

pub fn verificar_alternar_timer(usuario: &Usuario, chamado: &Chamado) -> Result<()> {
    verificar_nao_arquivado(chamado)?;
    verificar_responsavel(usuario, chamado)?;
    verificar_status(chamado, "toggle the timer of", &EM_TRABALHO)
}

pub fn verificar_resolver(usuario: &Usuario, chamado: &Chamado) -> Result<()> {
    verificar_nao_arquivado(chamado)?;
    verificar_responsavel(usuario, chamado)?;
    verificar_status(
        chamado,
        "resolve",
        &[StatusChamado::EmAndamento, StatusChamado::Pausado],
    )
}

/// Aprovar ou recusar uma resolução
pub fn verificar_revisar(usuario: &Usuario, chamado: &Chamado) -> Result<()> {
    verificar_nao_arquivado(chamado)?;
    verificar_gestor(usuario, "revisar resoluções")?;
    verificar_status(chamado, "review", &[StatusChamado::Resolvido])
}

pub fn verificar_arquivar(usuario: &Usuario, chamado: &Chamado) -> Result<()> {
    verificar_nao_arquivado(chamado)?;
    verificar_gestor(usuario, "arquivar chamados")?;
    verificar_status(chamado, "archive", &[StatusChamado::Aprovado])
}

pub fn verificar_definir_executores(usuario: &Usuario, chamado: &Chamado) -> Result<()> {
    verificar_nao_arquivado(chamado)?;
    verificar_gestor(usuario, "gerir responsáveis")?;
    verificar_status(
        chamado,
        "edit the executors of",
        &[
            StatusChamado::Aberto,
            StatusChamado::EmAndamento,
            StatusChamado::Pausado,
            StatusChamado::Resolvido,
        ],
    )
}

pub fn verificar_comentar(usuario: &Usuario, chamado: &Chamado) -> Result<()> {
    verificar_nao_arquivado(chamado)?;
    if !usuario.aprovado() {
        return Err(ChamadoError::Permissao(
            "Usuário aguardando aprovação".to_string(),
        ));
    }
    Ok(())
}

/// Guarda de uma ação do ciclo de vida, reavaliada dentro da seção atômica
/// de `aplicar_atualizacao`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regra {
    Assumir,
    AlternarTimer,
    Resolver,
    Revisar,
    Arquivar,
    DefinirExecutores,
    Comentar,
}

impl Regra {
    pub fn verificar(self, usuario: &Usuario, chamado: &Chamado) -> Result<()> {
        match self {
            Regra::Assumir => verificar_assumir(usuario, chamado),
            Regra::AlternarTimer => verificar_alternar_timer(usuario, chamado),
            Regra::Resolver => verificar_resolver(usuario, chamado),
            Regra::Revisar => verificar_revisar(usuario, chamado),
            Regra::Arquivar => verificar_arquivar(usuario, chamado),
            Regra::DefinirExecutores => verificar_definir_executores(usuario, chamado),
            Regra::Comentar => verificar_comentar(usuario, chamado),
        }
    }
}

/// Ações que o usuário pode executar no chamado, uma por operação do ciclo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcoesDisponiveis {
    /// "Juntar-se e Iniciar Trabalho" (apenas para quem ainda não é responsável)
    pub assumir: bool,
    pub alternar_timer: bool,
    /// O cronômetro do usuário está correndo (rótulo Pausar/Retomar)
    pub timer_rastreando: bool,
    pub resolver: bool,
    pub aprovar: bool,
    pub recusar: bool,
    pub arquivar: bool,
    pub gerir_executores: bool,
    pub comentar: bool,
}

impl AcoesDisponiveis {
    pub fn calcular(usuario: &Usuario, chamado: &Chamado) -> Self {
        let revisar = verificar_revisar(usuario, chamado).is_ok();
        Self {
            assumir: !chamado.is_executor(&usuario.uid)
                && verificar_assumir(usuario, chamado).is_ok(),
            alternar_timer: verificar_alternar_timer(usuario, chamado).is_ok(),
            timer_rastreando: chamado.esta_rastreando(&usuario.uid),
            resolver: verificar_resolver(usuario, chamado).is_ok(),
            aprovar: revisar,
            recusar: revisar,
            arquivar: verificar_arquivar(usuario, chamado).is_ok(),
            gerir_executores: verificar_definir_executores(usuario, chamado).is_ok(),
            comentar: verificar_comentar(usuario, chamado).is_ok(),
        }
    }

    /// Nenhuma ação disponível?
    pub fn nenhuma(&self) -> bool {
        !(self.assumir
            || self.alternar_timer
            || self.resolver
            || self.aprovar
            || self.recusar
            || self.arquivar
            || self.gerir_executores
            || self.comentar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Acesso, Prioridade};
    use chrono::{NaiveDate, Utc};
    use std::collections::BTreeMap;

    fn usuario(uid: &str, perfil: Perfil) -> Usuario {
        Usuario {
            uid: uid.to_string(),
            nome: uid.to_uppercase(),
            email: format!("{}@example.com", uid),
            perfil,
            acesso: Acesso::Aprovado,
            discord_id: None,
        }
    }

    fn chamado(status: StatusChamado, executores: &[&str]) -> Chamado {
        Chamado {
            id: "c".to_string(),
            titulo: "T".to_string(),
            descricao: "D".to_string(),
            prioridade: Prioridade::Baixa,
            prazo: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            status,
            solicitante_id: "g".to_string(),
            executor_ids: executores.iter().map(|s| s.to_string()).collect(),
            time_tracking: BTreeMap::new(),
            tempo_gasto: 0,
            tempo_gasto_horas_legado: None,
            arquivado: false,
            comentarios: Vec::new(),
            historico: Vec::new(),
            notas_resolucao: None,
            justificativa_gestor: None,
            recusado_anteriormente: false,
            criado_em: Utc::now(),
            resolvido_em: None,
        }
    }

    #[test]
    fn test_pode_agir_tabela_completa() {
        use StatusChamado::*;
        let todos = [Aberto, EmAndamento, Pausado, Resolvido, Aprovado];

        for status in todos {
            let c = chamado(status, &["a"]);
            assert_eq!(
                pode_agir(Perfil::Gestor, &c, "g"),
                matches!(status, Aberto | Resolvido),
                "gestor em {}",
                status
            );
            assert_eq!(
                pode_agir(Perfil::Executor, &c, "a"),
                matches!(status, Aberto | EmAndamento),
                "executor responsável em {}",
                status
            );
            assert_eq!(
                pode_agir(Perfil::Executor, &c, "b"),
                status == Aberto,
                "executor de fora em {}",
                status
            );

            let mut arquivado = c.clone();
            arquivado.arquivado = true;
            assert!(!pode_agir(Perfil::Gestor, &arquivado, "g"));
            assert!(!pode_agir(Perfil::Executor, &arquivado, "a"));
        }
    }

    #[test]
    fn test_acao_sugerida() {
        let resolvido = chamado(StatusChamado::Resolvido, &["a"]);
        assert_eq!(acao_sugerida(Perfil::Gestor, &resolvido, "g"), Some("Revisar"));
        assert_eq!(acao_sugerida(Perfil::Executor, &resolvido, "a"), None);

        let aberto = chamado(StatusChamado::Aberto, &[]);
        assert_eq!(acao_sugerida(Perfil::Executor, &aberto, "a"), Some("Assumir"));

        let andamento = chamado(StatusChamado::EmAndamento, &["a"]);
        assert_eq!(acao_sugerida(Perfil::Executor, &andamento, "a"), Some("Resolver"));
        assert_eq!(acao_sugerida(Perfil::Executor, &andamento, "b"), None);
    }

    #[test]
    fn test_arquivado_bloqueia_tudo() {
        let gestor = usuario("g", Perfil::Gestor);
        let executor = usuario("a", Perfil::Executor);
        let mut c = chamado(StatusChamado::Aprovado, &["a"]);
        c.arquivado = true;

        for u in [&gestor, &executor] {
            assert!(AcoesDisponiveis::calcular(u, &c).nenhuma());
            assert!(verificar_assumir(u, &c).is_err());
            assert!(verificar_alternar_timer(u, &c).is_err());
            assert!(verificar_resolver(u, &c).is_err());
            assert!(verificar_revisar(u, &c).is_err());
            assert!(verificar_arquivar(u, &c).is_err());
            assert!(verificar_definir_executores(u, &c).is_err());
            assert!(verificar_comentar(u, &c).is_err());
        }
    }

    #[test]
    fn test_acoes_executor_em_andamento() {
        let executor = usuario("a", Perfil::Executor);
        let c = chamado(StatusChamado::EmAndamento, &["a"]);
        let acoes = AcoesDisponiveis::calcular(&executor, &c);

        assert!(!acoes.assumir);
        assert!(acoes.alternar_timer);
        assert!(acoes.resolver);
        assert!(!acoes.aprovar);
        assert!(!acoes.gerir_executores);
        assert!(acoes.comentar);
    }

    #[test]
    fn test_revisao_apenas_gestor() {
        let c = chamado(StatusChamado::Resolvido, &["a"]);
        assert!(matches!(
            verificar_revisar(&usuario("a", Perfil::Executor), &c),
            Err(ChamadoError::Permissao(_))
        ));
        assert!(verificar_revisar(&usuario("g", Perfil::Gestor), &c).is_ok());

        let aberto = chamado(StatusChamado::Aberto, &[]);
        assert!(matches!(
            verificar_revisar(&usuario("g", Perfil::Gestor), &aberto),
            Err(ChamadoError::TransicaoInvalida { .. })
        ));
    }

    #[test]
    fn test_pendente_nao_comenta() {
        let mut pendente = usuario("p", Perfil::Executor);
        pendente.acesso = Acesso::Pendente;
        let c = chamado(StatusChamado::Aberto, &[]);
        assert!(verificar_comentar(&pendente, &c).is_err());
    }
}
