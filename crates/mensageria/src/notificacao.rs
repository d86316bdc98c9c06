//! Derivação de notificações a partir dos eventos do repositório
//!
//! Um chamado novo gera um anúncio. Uma atualização é comparada (antes ×
//! depois) em três condições independentes:
//! 1. novos responsáveis → mensagem direta para cada um
//! 2. mais comentários → aviso no canal com o comentário mais recente
//! 3. mudança de status → anúncio de Resolvido, Aprovado ou Recusado

use chamados::{Chamado, Comentario, EventoChamado, StatusChamado};

/// Tipo de anúncio de mudança de status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MudancaStatus {
    Resolvido,
    Aprovado,
    Recusado,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notificacao {
    ChamadoAberto { chamado: Chamado },
    ResponsavelAdicionado { usuario_id: String, chamado: Chamado },
    NovoComentario { comentario: Comentario, chamado: Chamado },
    Status { mudanca: MudancaStatus, chamado: Chamado },
}

impl Notificacao {
    pub fn chamado(&self) -> &Chamado {
        match self {
            Notificacao::ChamadoAberto { chamado }
            | Notificacao::ResponsavelAdicionado { chamado, .. }
            | Notificacao::NovoComentario { chamado, .. }
            | Notificacao::Status { chamado, .. } => chamado,
        }
    }
}

/// Classifica a mudança de status, se for uma das anunciadas
///
/// A recusa aparece como Resolvido → Em Andamento com a marca de revisão
/// (o status "Recusado" nunca fica gravado).
pub fn classificar_status(antes: &Chamado, depois: &Chamado) -> Option<MudancaStatus> {
    if antes.status == depois.status {
        return None;
    }
    match depois.status {
        StatusChamado::Resolvido => Some(MudancaStatus::Resolvido),
        StatusChamado::Aprovado => Some(MudancaStatus::Aprovado),
        StatusChamado::EmAndamento
            if antes.status == StatusChamado::Recusado
                || (antes.status == StatusChamado::Resolvido && depois.recusado_anteriormente) =>
        {
            Some(MudancaStatus::Recusado)
        }
        _ => None,
    }
}

pub fn derivar(evento: &EventoChamado) -> Vec<Notificacao> {
    match evento {
        EventoChamado::Criado { depois } => vec![Notificacao::ChamadoAberto {
            chamado: depois.clone(),
        }],
        EventoChamado::Atualizado { antes, depois } => derivar_atualizacao(antes, depois),
    }
}

fn derivar_atualizacao(antes: &Chamado, depois: &Chamado) -> Vec<Notificacao> {
    let mut notificacoes = Vec::new();

    for usuario_id in depois.executor_ids.iter().filter(|id| !antes.is_executor(id)) {
        notificacoes.push(Notificacao::ResponsavelAdicionado {
            usuario_id: usuario_id.clone(),
            chamado: depois.clone(),
        });
    }

    if depois.comentarios.len() > antes.comentarios.len() {
        if let Some(comentario) = depois.comentarios.last() {
            notificacoes.push(Notificacao::NovoComentario {
                comentario: comentario.clone(),
                chamado: depois.clone(),
            });
        }
    }

    if let Some(mudanca) = classificar_status(antes, depois) {
        notificacoes.push(Notificacao::Status {
            mudanca,
            chamado: depois.clone(),
        });
    }

    notificacoes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chamados::Prioridade;
    use chrono::{NaiveDate, Utc};

    fn chamado() -> Chamado {
        Chamado {
            id: "c1".to_string(),
            titulo: "VPN".to_string(),
            descricao: "Não conecta".to_string(),
            prioridade: Prioridade::Alta,
            prazo: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            status: StatusChamado::Aberto,
            solicitante_id: "g".to_string(),
            executor_ids: Vec::new(),
            time_tracking: Default::default(),
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
    fn test_criado_gera_anuncio() {
        let evento = EventoChamado::Criado { depois: chamado() };
        let notificacoes = derivar(&evento);
        assert_eq!(notificacoes.len(), 1);
        assert!(matches!(notificacoes[0], Notificacao::ChamadoAberto { .. }));
    }

    #[test]
    fn test_tres_condicoes_independentes() {
        let antes = chamado();
        let mut depois = antes.clone();
        depois.executor_ids = vec!["a".to_string(), "b".to_string()];
        depois.status = StatusChamado::EmAndamento;
        depois.comentarios.push(Comentario {
            texto: "olhando".to_string(),
            autor_nome: "Ana".to_string(),
            autor_id: "a".to_string(),
            timestamp: Utc::now(),
        });

        let notificacoes = derivar(&EventoChamado::Atualizado { antes, depois });
        // 2 responsáveis + 1 comentário; Aberto → Em Andamento não é anunciado
        assert_eq!(notificacoes.len(), 3);
        assert!(matches!(
            &notificacoes[0],
            Notificacao::ResponsavelAdicionado { usuario_id, .. } if usuario_id == "a"
        ));
        assert!(matches!(notificacoes[2], Notificacao::NovoComentario { .. }));
    }

    #[test]
    fn test_executor_ja_presente_nao_notifica() {
        let mut antes = chamado();
        antes.executor_ids = vec!["a".to_string()];
        let mut depois = antes.clone();
        depois.executor_ids = vec!["a".to_string(), "b".to_string()];

        let notificacoes = derivar(&EventoChamado::Atualizado { antes, depois });
        assert_eq!(notificacoes.len(), 1);
        assert!(matches!(
            &notificacoes[0],
            Notificacao::ResponsavelAdicionado { usuario_id, .. } if usuario_id == "b"
        ));
    }

    #[test]
    fn test_classificar_status() {
        let mut antes = chamado();
        antes.status = StatusChamado::EmAndamento;
        let mut depois = antes.clone();
        depois.status = StatusChamado::Resolvido;
        assert_eq!(classificar_status(&antes, &depois), Some(MudancaStatus::Resolvido));

        let antes = depois.clone();
        let mut aprovado = antes.clone();
        aprovado.status = StatusChamado::Aprovado;
        assert_eq!(classificar_status(&antes, &aprovado), Some(MudancaStatus::Aprovado));

        let mut recusado = antes.clone();
        recusado.status = StatusChamado::EmAndamento;
        recusado.recusado_anteriormente = true;
        assert_eq!(classificar_status(&antes, &recusado), Some(MudancaStatus::Recusado));

        // Pausado → Em Andamento não é anunciado
        let mut pausado = chamado();
        pausado.status = StatusChamado::Pausado;
        pausado.recusado_anteriormente = true;
        let mut retomado = pausado.clone();
        retomado.status = StatusChamado::EmAndamento;
        assert_eq!(classificar_status(&pausado, &retomado), None);
    }
}
