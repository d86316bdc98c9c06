//! Composição das mensagens do Discord

use chamados::Chamado;
use chrono::NaiveDate;
use discord::{Embed, MessagePayload};

use crate::notificacao::{MudancaStatus, Notificacao};

pub const COR_AZUL: u32 = 0x3498db;
pub const COR_VERDE: u32 = 0x2ecc71;
pub const COR_ROXA: u32 = 0x9b59b6;
pub const COR_VERMELHA: u32 = 0xe74c3c;

const LIMITE_DESCRICAO: usize = 200;

/// Destino de uma mensagem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destino {
    /// Canal geral configurado
    Canal,
    /// Mensagem direta ao usuário do TaskFlow (resolvido para o discordId)
    Usuario(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envio {
    pub destino: Destino,
    pub payload: MessagePayload,
}

/// Primeiros `max_chars` caracteres, sem cortar no meio de um caractere
pub fn trecho(texto: &str, max_chars: usize) -> &str {
    match texto.char_indices().nth(max_chars) {
        Some((fim, _)) => &texto[..fim],
        None => texto,
    }
}

/// Resumo da descrição para o anúncio (200 caracteres + "...")
pub fn resumo_descricao(descricao: &str) -> String {
    format!("{}...", trecho(descricao, LIMITE_DESCRICAO))
}

pub fn formatar_prazo(prazo: Option<NaiveDate>) -> String {
    prazo
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "Não definido".to_string())
}

fn anuncio(chamado: &Chamado, solicitante: &str) -> MessagePayload {
    let embed = Embed::new(format!("📢 Novo Chamado Aberto: {}", chamado.titulo))
        .description(format!(
            "Um novo chamado de prioridade **{}** foi criado por **{}**.",
            chamado.prioridade, solicitante
        ))
        .color(COR_AZUL)
        .field("Descrição", resumo_descricao(&chamado.descricao))
        .field("Prazo", formatar_prazo(Some(chamado.prazo)))
        .timestamp(chamado.criado_em.to_rfc3339());
    MessagePayload::embed(embed)
}

fn status(mudanca: MudancaStatus, chamado: &Chamado) -> MessagePayload {
    let embed = match mudanca {
        MudancaStatus::Resolvido => Embed::new(format!("🔧 Chamado Resolvido: {}", chamado.titulo))
            .description("O chamado foi marcado como resolvido e aguarda aprovação.")
            .color(COR_ROXA),
        MudancaStatus::Aprovado => Embed::new(format!("🎉 Chamado Aprovado: {}", chamado.titulo))
            .description("O chamado foi aprovado e finalizado com sucesso!")
            .color(COR_VERDE),
        MudancaStatus::Recusado => Embed::new(format!("❌ Chamado Recusado: {}", chamado.titulo))
            .description(format!(
                "O chamado foi recusado e voltou para \"Em Andamento\". Justificativa: **{}**",
                chamado.justificativa_gestor.as_deref().unwrap_or("N/A")
            ))
            .color(COR_VERMELHA),
    };
    MessagePayload::embed(embed)
}

/// Monta a mensagem de uma notificação
///
/// `solicitante` é o nome de quem abriu o chamado ("Desconhecido" se não
/// houver perfil).
pub fn compor(notificacao: &Notificacao, solicitante: &str) -> Envio {
    match notificacao {
        Notificacao::ChamadoAberto { chamado } => Envio {
            destino: Destino::Canal,
            payload: anuncio(chamado, solicitante),
        },
        Notificacao::ResponsavelAdicionado {
            usuario_id,
            chamado,
        } => Envio {
            destino: Destino::Usuario(usuario_id.clone()),
            payload: MessagePayload::embed(
                Embed::new(format!(
                    "✅ Você foi atribuído a um novo chamado: {}",
                    chamado.titulo
                ))
                .description(format!(
                    "Criado por **{}**. Por favor, verifique o dashboard.",
                    solicitante
                ))
                .color(COR_VERDE),
            ),
        },
        Notificacao::NovoComentario {
            comentario,
            chamado,
        } => Envio {
            destino: Destino::Canal,
            payload: MessagePayload::text(format!(
                "💬 **{}** adicionou um novo comentário no chamado **\"{}\"**.",
                comentario.autor_nome, chamado.titulo
            )),
        },
        Notificacao::Status { mudanca, chamado } => Envio {
            destino: Destino::Canal,
            payload: status(*mudanca, chamado),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chamados::{Prioridade, StatusChamado};
    use chrono::Utc;

    fn chamado(descricao: &str) -> Chamado {
        Chamado {
            id: "c1".to_string(),
            titulo: "Impressora".to_string(),
            descricao: descricao.to_string(),
            prioridade: Prioridade::Media,
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
    fn test_trecho_utf8() {
        assert_eq!(trecho("ação rápida", 4), "ação");
        assert_eq!(trecho("curto", 200), "curto");
        assert_eq!(trecho("🌍🌍🌍", 2), "🌍🌍");
    }

    #[test]
    fn test_resumo_descricao() {
        let longa = "á".repeat(250);
        let resumo = resumo_descricao(&longa);
        assert_eq!(resumo.chars().count(), 203);
        assert!(resumo.ends_with("..."));
        assert_eq!(resumo_descricao("curta"), "curta...");
    }

    #[test]
    fn test_formatar_prazo() {
        assert_eq!(formatar_prazo(NaiveDate::from_ymd_opt(2025, 3, 7)), "07/03/2025");
        assert_eq!(formatar_prazo(None), "Não definido");
    }

    #[test]
    fn test_anuncio_chamado_aberto() {
        let envio = compor(
            &Notificacao::ChamadoAberto {
                chamado: chamado("Papel atolado"),
            },
            "Gina",
        );
        assert_eq!(envio.destino, Destino::Canal);
        let embed = &envio.payload.embeds[0];
        assert_eq!(embed.title.as_deref(), Some("📢 Novo Chamado Aberto: Impressora"));
        assert_eq!(
            embed.description.as_deref(),
            Some("Um novo chamado de prioridade **Média** foi criado por **Gina**.")
        );
        assert_eq!(embed.color, Some(COR_AZUL));
        assert_eq!(embed.fields[0].value, "Papel atolado...");
        assert_eq!(embed.fields[1].value, "31/12/2025");
    }

    #[test]
    fn test_recusa_sem_justificativa() {
        let envio = compor(
            &Notificacao::Status {
                mudanca: MudancaStatus::Recusado,
                chamado: chamado("x"),
            },
            "Gina",
        );
        let embed = &envio.payload.embeds[0];
        assert_eq!(embed.color, Some(COR_VERMELHA));
        assert!(embed.description.as_deref().unwrap().ends_with("**N/A**"));
    }

    #[test]
    fn test_atribuicao_vai_para_usuario() {
        let envio = compor(
            &Notificacao::ResponsavelAdicionado {
                usuario_id: "a".to_string(),
                chamado: chamado("x"),
            },
            "Gina",
        );
        assert_eq!(envio.destino, Destino::Usuario("a".to_string()));
        assert_eq!(envio.payload.embeds[0].color, Some(COR_VERDE));
    }
}
