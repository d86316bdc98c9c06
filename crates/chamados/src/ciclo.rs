//! Controlador do ciclo de vida dos chamados
//!
//! ```text
//! Aberto ──assumir──▶ Em Andamento ⇄ Pausado ──resolver──▶ Resolvido
//!                          ▲                                 │
//!                          └──────────── recusar ────────────┤
//!                                                            ▼
//!                                        arquivado ◀──── Aprovado
//! ```
//!
//! Toda ação roda as guardas de `permissoes` antes de tocar no repositório e
//! grava uma única atualização atômica (uma entrada de histórico por ação).
//! A mesma guarda segue junto da atualização (`Regra`) e é reavaliada pelo
//! repositório sobre o registro travado.

use std::sync::Arc;

use crate::error::{ChamadoError, Result};
use crate::permissoes::{self, Regra};
use crate::relogio::Relogio;
use crate::repositorio::{AtualizacaoChamado, ChamadoRepository};
use crate::tempo::MotorTempo;
use crate::types::{Chamado, Comentario, NovoChamado, StatusChamado, Usuario};

/// Resultado da migração de tempo legado
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatorioMigracao {
    pub chamados_convertidos: usize,
    pub ids: Vec<String>,
}

#[derive(Clone)]
pub struct CicloChamados {
    repositorio: Arc<dyn ChamadoRepository>,
    motor: MotorTempo,
}

impl CicloChamados {
    pub fn new(repositorio: Arc<dyn ChamadoRepository>, relogio: Arc<dyn Relogio>) -> Self {
        let motor = MotorTempo::new(repositorio.clone(), relogio);
        Self { repositorio, motor }
    }

    pub fn repositorio(&self) -> &Arc<dyn ChamadoRepository> {
        &self.repositorio
    }

    pub fn motor(&self) -> &MotorTempo {
        &self.motor
    }

    /// Abre um chamado (apenas gestores); o solicitante é o próprio ator
    pub async fn criar(&self, ator: &Usuario, mut novo: NovoChamado) -> Result<Chamado> {
        permissoes::verificar_criar(ator)?;
        novo.solicitante_id = ator.uid.clone();

        let id = self.repositorio.criar(novo).await?;
        self.repositorio.obter(&id).await
    }

    /// Junta o ator aos responsáveis e inicia o seu cronômetro
    pub async fn assumir(&self, id: &str, ator: &Usuario) -> Result<Chamado> {
        let chamado = self.repositorio.obter(id).await?;
        permissoes::verificar_assumir(ator, &chamado)?;

        let acao = if chamado.is_executor(&ator.uid) {
            format!("{} retomou o trabalho.", ator.nome)
        } else {
            format!("{} juntou-se ao chamado.", ator.nome)
        };
        let base = AtualizacaoChamado::new()
            .guarda(Regra::Assumir, ator)
            .adicionar_executor(ator.uid.clone())
            .status(StatusChamado::EmAndamento);

        self.motor.iniciar(id, &ator.uid, base, &acao).await
    }

    /// Pausa ou retoma o cronômetro do ator
    ///
    /// Ao pausar, o chamado só vai para `Pausado` se ninguém mais estiver
    /// trabalhando nele.
    pub async fn alternar_timer(&self, id: &str, ator: &Usuario) -> Result<Chamado> {
        let chamado = self.repositorio.obter(id).await?;
        permissoes::verificar_alternar_timer(ator, &chamado)?;

        if chamado.esta_rastreando(&ator.uid) {
            let acao = format!("{} pausou o trabalho.", ator.nome);
            let base = AtualizacaoChamado::new()
                .guarda(Regra::AlternarTimer, ator)
                .pausar_se_ocioso();
            self.motor.parar(id, &ator.uid, base, &acao).await
        } else {
            let acao = format!("{} retomou o trabalho.", ator.nome);
            let base = AtualizacaoChamado::new()
                .guarda(Regra::AlternarTimer, ator)
                .status(StatusChamado::EmAndamento);
            self.motor.iniciar(id, &ator.uid, base, &acao).await
        }
    }

    /// Marca como resolvido, parando antes todos os cronômetros em andamento
    pub async fn resolver(&self, id: &str, ator: &Usuario, notas: &str) -> Result<Chamado> {
        if notas.trim().is_empty() {
            return Err(ChamadoError::Validacao(
                "Notas de resolução são obrigatórias para resolver".to_string(),
            ));
        }
        let chamado = self.repositorio.obter(id).await?;
        permissoes::verificar_resolver(ator, &chamado)?;

        let base = AtualizacaoChamado::new()
            .guarda(Regra::Resolver, ator)
            .status(StatusChamado::Resolvido)
            .notas_resolucao(notas.trim());
        self.motor
            .parar_todos(id, &ator.uid, base, "Marcou o chamado como Resolvido")
            .await
    }

    pub async fn aprovar(
        &self,
        id: &str,
        ator: &Usuario,
        justificativa: Option<&str>,
    ) -> Result<Chamado> {
        let chamado = self.repositorio.obter(id).await?;
        permissoes::verificar_revisar(ator, &chamado)?;

        let mut base = AtualizacaoChamado::new()
            .guarda(Regra::Revisar, ator)
            .status(StatusChamado::Aprovado);
        if let Some(texto) = justificativa.map(str::trim).filter(|t| !t.is_empty()) {
            base = base.justificativa_gestor(texto);
        }
        self.motor
            .parar_todos(id, &ator.uid, base, "Aprovou o chamado")
            .await
    }

    /// Recusa a resolução: volta para `Em Andamento` marcado para revisão
    pub async fn recusar(&self, id: &str, ator: &Usuario, justificativa: &str) -> Result<Chamado> {
        let justificativa = justificativa.trim();
        if justificativa.is_empty() {
            return Err(ChamadoError::Validacao(
                "Justificativa é obrigatória para recusar".to_string(),
            ));
        }
        let chamado = self.repositorio.obter(id).await?;
        permissoes::verificar_revisar(ator, &chamado)?;

        let atualizacao = AtualizacaoChamado::new()
            .guarda(Regra::Revisar, ator)
            .status(StatusChamado::EmAndamento)
            .recusado_anteriormente(true)
            .justificativa_gestor(justificativa);
        self.repositorio
            .aplicar_atualizacao(
                id,
                atualizacao,
                &ator.uid,
                &format!("Recusou o chamado: {}", justificativa),
            )
            .await
    }

    pub async fn arquivar(&self, id: &str, ator: &Usuario) -> Result<Chamado> {
        let chamado = self.repositorio.obter(id).await?;
        permissoes::verificar_arquivar(ator, &chamado)?;

        let base = AtualizacaoChamado::new()
            .guarda(Regra::Arquivar, ator)
            .arquivado(true);
        let chamado = self
            .motor
            .parar_todos(id, &ator.uid, base, "Arquivou o chamado")
            .await?;

        tracing::info!("🗄️ Chamado {} arquivado por {}", id, ator.uid);
        Ok(chamado)
    }

    /// Substitui a lista de responsáveis (última escrita vence)
    ///
    /// Quem sai tem o cronômetro parado; se ninguém mais estiver trabalhando,
    /// o chamado vai para `Pausado`.
    pub async fn definir_executores(
        &self,
        id: &str,
        ator: &Usuario,
        executores: &[Usuario],
    ) -> Result<Chamado> {
        let chamado = self.repositorio.obter(id).await?;
        permissoes::verificar_definir_executores(ator, &chamado)?;

        let ids: Vec<String> = executores.iter().map(|u| u.uid.clone()).collect();
        let nomes = executores
            .iter()
            .map(|u| u.nome.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let acao = format!(
            "Atualizou responsáveis para: {}",
            if nomes.is_empty() { "Ninguém" } else { nomes.as_str() }
        );

        self.repositorio
            .aplicar_atualizacao(
                id,
                AtualizacaoChamado::new()
                    .guarda(Regra::DefinirExecutores, ator)
                    .substituir_executores(ids)
                    .pausar_se_ocioso(),
                &ator.uid,
                &acao,
            )
            .await
    }

    pub async fn comentar(&self, id: &str, ator: &Usuario, texto: &str) -> Result<Chamado> {
        if texto.trim().is_empty() {
            return Err(ChamadoError::Validacao("Digite uma resposta".to_string()));
        }
        let chamado = self.repositorio.obter(id).await?;
        permissoes::verificar_comentar(ator, &chamado)?;

        let comentario = Comentario {
            texto: texto.to_string(),
            autor_nome: ator.nome.clone(),
            autor_id: ator.uid.clone(),
            timestamp: self.motor.agora(),
        };
        self.repositorio
            .aplicar_atualizacao(
                id,
                AtualizacaoChamado::new()
                    .guarda(Regra::Comentar, ator)
                    .comentario(comentario),
                &ator.uid,
                &format!("{} comentou.", ator.nome),
            )
            .await
    }

    /// Converte valores legados em horas para segundos (execução única)
    ///
    /// Vale também para chamados arquivados: é correção de dados, não ação
    /// do ciclo de vida.
    pub async fn migrar_tempo_legado(&self, ator_id: &str) -> Result<RelatorioMigracao> {
        let mut relatorio = RelatorioMigracao::default();

        for chamado in self.repositorio.listar_todos().await? {
            let Some(horas) = chamado.tempo_gasto_horas_legado else {
                continue;
            };
            let atualizacao = AtualizacaoChamado::new()
                .converter_tempo_legado()
                .detalhes(format!("{} h convertidas para segundos", horas));
            self.repositorio
                .aplicar_atualizacao(&chamado.id, atualizacao, ator_id, "Migrou tempo legado")
                .await?;

            relatorio.chamados_convertidos += 1;
            relatorio.ids.push(chamado.id);
        }

        tracing::info!(
            "🔁 Migração de tempo legado concluída: {} chamados convertidos",
            relatorio.chamados_convertidos
        );
        Ok(relatorio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memoria::MemoriaChamados;
    use crate::relogio::RelogioManual;
    use crate::repositorio::{Assinatura, EventoChamado, FiltroChamados};
    use crate::types::{Acesso, EstadoTimer, Perfil, Prioridade};
    use tokio::sync::broadcast;
    use chrono::{NaiveDate, TimeZone, Utc};

    struct Cenario {
        ciclo: CicloChamados,
        relogio: Arc<RelogioManual>,
        gestor: Usuario,
        ana: Usuario,
        bruno: Usuario,
    }

    fn usuario(uid: &str, nome: &str, perfil: Perfil) -> Usuario {
        Usuario {
            uid: uid.to_string(),
            nome: nome.to_string(),
            email: format!("{}@example.com", uid),
            perfil,
            acesso: Acesso::Aprovado,
            discord_id: None,
        }
    }

    fn cenario() -> Cenario {
        let relogio = Arc::new(RelogioManual::new(
            Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap(),
        ));
        let repo = Arc::new(MemoriaChamados::new(relogio.clone()));
        Cenario {
            ciclo: CicloChamados::new(repo, relogio.clone()),
            relogio,
            gestor: usuario("g", "Gina", Perfil::Gestor),
            ana: usuario("a", "Ana", Perfil::Executor),
            bruno: usuario("b", "Bruno", Perfil::Executor),
        }
    }

    fn novo() -> NovoChamado {
        NovoChamado {
            titulo: "Impressora travada".to_string(),
            descricao: "Setor financeiro".to_string(),
            prioridade: Some(Prioridade::Alta),
            prazo: NaiveDate::from_ymd_opt(2025, 12, 31),
            solicitante_id: String::new(),
        }
    }

    #[tokio::test]
    async fn test_executor_nao_cria_chamado() {
        let c = cenario();
        let resultado = c.ciclo.criar(&c.ana, novo()).await;
        assert!(matches!(resultado, Err(ChamadoError::Permissao(_))));
    }

    #[tokio::test]
    async fn test_cenario_completo() {
        let c = cenario();
        let chamado = c.ciclo.criar(&c.gestor, novo()).await.unwrap();
        let id = chamado.id.clone();
        assert_eq!(chamado.status, StatusChamado::Aberto);
        assert_eq!(chamado.solicitante_id, "g");
        assert_eq!(chamado.prioridade, Prioridade::Alta);

        let chamado = c.ciclo.assumir(&id, &c.ana).await.unwrap();
        assert_eq!(chamado.status, StatusChamado::EmAndamento);
        assert!(chamado.esta_rastreando("a"));
        assert_eq!(chamado.historico.last().unwrap().acao, "Ana juntou-se ao chamado.");

        c.relogio.avancar(3600);
        let chamado = c.ciclo.alternar_timer(&id, &c.ana).await.unwrap();
        assert_eq!(chamado.tempo_gasto, 3600);
        assert_eq!(chamado.total_usuario("a"), 3600);
        assert_eq!(chamado.status, StatusChamado::Pausado);

        let chamado = c.ciclo.resolver(&id, &c.ana, "fixed").await.unwrap();
        assert_eq!(chamado.status, StatusChamado::Resolvido);
        assert_eq!(chamado.notas_resolucao.as_deref(), Some("fixed"));
        assert!(chamado.resolvido_em.is_some());
        assert!(!chamado.alguem_rastreando());

        let chamado = c.ciclo.recusar(&id, &c.gestor, "incomplete").await.unwrap();
        assert_eq!(chamado.status, StatusChamado::EmAndamento);
        assert!(chamado.recusado_anteriormente);
        assert_eq!(chamado.justificativa_gestor.as_deref(), Some("incomplete"));
        assert_eq!(
            chamado.historico.last().unwrap().acao,
            "Recusou o chamado: incomplete"
        );

        let chamado = c.ciclo.resolver(&id, &c.ana, "fixed again").await.unwrap();
        assert_eq!(chamado.status, StatusChamado::Resolvido);

        let chamado = c.ciclo.aprovar(&id, &c.gestor, None).await.unwrap();
        assert_eq!(chamado.status, StatusChamado::Aprovado);
        assert_eq!(chamado.justificativa_gestor.as_deref(), Some("incomplete"));

        let chamado = c.ciclo.arquivar(&id, &c.gestor).await.unwrap();
        assert!(chamado.arquivado);
        assert_eq!(chamado.tempo_gasto, 3600);

        // Criado + 7 ações
        assert_eq!(chamado.historico.len(), 8);

        assert!(c.ciclo.assumir(&id, &c.ana).await.is_err());
        assert!(c.ciclo.comentar(&id, &c.gestor, "oi").await.is_err());
        assert!(c.ciclo.arquivar(&id, &c.gestor).await.is_err());
        assert!(c.ciclo.definir_executores(&id, &c.gestor, &[]).await.is_err());
        let depois = c.ciclo.repositorio().obter(&id).await.unwrap();
        assert_eq!(depois.historico.len(), 8, "ações recusadas não gravam histórico");
    }

    #[tokio::test]
    async fn test_resolver_com_dois_executores_rastreando() {
        let c = cenario();
        let id = c.ciclo.criar(&c.gestor, novo()).await.unwrap().id;

        c.ciclo.assumir(&id, &c.ana).await.unwrap();
        c.relogio.avancar(100);
        c.ciclo.assumir(&id, &c.bruno).await.unwrap();
        c.relogio.avancar(50);

        let chamado = c.ciclo.resolver(&id, &c.bruno, "ok").await.unwrap();
        assert_eq!(chamado.status, StatusChamado::Resolvido);
        assert_eq!(chamado.total_usuario("a"), 150);
        assert_eq!(chamado.total_usuario("b"), 50);
        assert_eq!(chamado.tempo_gasto, 200);
        for timer in chamado.time_tracking.values() {
            assert_eq!(timer.status, EstadoTimer::Paused);
        }
    }

    #[tokio::test]
    async fn test_pausa_com_outro_trabalhando_mantem_status() {
        let c = cenario();
        let id = c.ciclo.criar(&c.gestor, novo()).await.unwrap().id;
        c.ciclo.assumir(&id, &c.ana).await.unwrap();
        c.ciclo.assumir(&id, &c.bruno).await.unwrap();

        c.relogio.avancar(10);
        let chamado = c.ciclo.alternar_timer(&id, &c.ana).await.unwrap();
        assert_eq!(chamado.status, StatusChamado::EmAndamento);
        assert_eq!(chamado.historico.last().unwrap().acao, "Ana pausou o trabalho.");

        let chamado = c.ciclo.alternar_timer(&id, &c.ana).await.unwrap();
        assert!(chamado.esta_rastreando("a"));
        assert_eq!(chamado.historico.last().unwrap().acao, "Ana retomou o trabalho.");
    }

    #[tokio::test]
    async fn test_validacoes_antes_de_mutar() {
        let c = cenario();
        let id = c.ciclo.criar(&c.gestor, novo()).await.unwrap().id;
        c.ciclo.assumir(&id, &c.ana).await.unwrap();

        assert!(matches!(
            c.ciclo.resolver(&id, &c.ana, "   ").await,
            Err(ChamadoError::Validacao(_))
        ));
        assert!(matches!(
            c.ciclo.resolver(&id, &c.bruno, "feito").await,
            Err(ChamadoError::Permissao(_))
        ));
        assert!(matches!(
            c.ciclo.alternar_timer(&id, &c.bruno).await,
            Err(ChamadoError::Permissao(_))
        ));
        assert!(matches!(
            c.ciclo.aprovar(&id, &c.gestor, None).await,
            Err(ChamadoError::TransicaoInvalida { .. })
        ));

        c.ciclo.resolver(&id, &c.ana, "feito").await.unwrap();
        assert!(matches!(
            c.ciclo.recusar(&id, &c.gestor, "").await,
            Err(ChamadoError::Validacao(_))
        ));
        assert!(matches!(
            c.ciclo.aprovar(&id, &c.ana, None).await,
            Err(ChamadoError::Permissao(_))
        ));

        let chamado = c.ciclo.repositorio().obter(&id).await.unwrap();
        assert_eq!(chamado.historico.len(), 3);
    }

    #[tokio::test]
    async fn test_inexistente() {
        let c = cenario();
        assert!(matches!(
            c.ciclo.assumir("nao-existe", &c.ana).await,
            Err(ChamadoError::NaoEncontrado(_))
        ));
    }

    /// Repositório que cede a vez depois de cada leitura pontual, para
    /// intercalar ações concorrentes entre a leitura e a escrita
    struct RepositorioComAtraso(MemoriaChamados);

    #[async_trait::async_trait]
    impl ChamadoRepository for RepositorioComAtraso {
        async fn criar(&self, novo: NovoChamado) -> Result<String> {
            self.0.criar(novo).await
        }

        async fn aplicar_atualizacao(
            &self,
            id: &str,
            atualizacao: AtualizacaoChamado,
            ator_id: &str,
            acao: &str,
        ) -> Result<Chamado> {
            self.0.aplicar_atualizacao(id, atualizacao, ator_id, acao).await
        }

        async fn obter(&self, id: &str) -> Result<Chamado> {
            let chamado = self.0.obter(id).await;
            tokio::task::yield_now().await;
            chamado
        }

        async fn listar(&self, filtro: &FiltroChamados) -> Result<Vec<Chamado>> {
            self.0.listar(filtro).await
        }

        async fn importar(&self, chamado: Chamado) -> Result<()> {
            self.0.importar(chamado).await
        }

        async fn assinar(&self, filtro: FiltroChamados) -> Result<Assinatura> {
            self.0.assinar(filtro).await
        }

        fn eventos(&self) -> broadcast::Receiver<EventoChamado> {
            self.0.eventos()
        }
    }

    #[tokio::test]
    async fn test_retomar_concorrente_nao_reabre_resolvido() {
        let relogio = Arc::new(RelogioManual::new(
            Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap(),
        ));
        let repo = Arc::new(RepositorioComAtraso(MemoriaChamados::new(relogio.clone())));
        let ciclo = CicloChamados::new(repo, relogio.clone());
        let gestor = usuario("g", "Gina", Perfil::Gestor);
        let ana = usuario("a", "Ana", Perfil::Executor);
        let bruno = usuario("b", "Bruno", Perfil::Executor);

        let id = ciclo.criar(&gestor, novo()).await.unwrap().id;
        ciclo.assumir(&id, &ana).await.unwrap();
        ciclo.assumir(&id, &bruno).await.unwrap();
        relogio.avancar(60);
        ciclo.alternar_timer(&id, &ana).await.unwrap();

        // Ana retoma enquanto Bruno resolve; as duas leem o estado antes de gravar
        let (retomada, resolucao) = tokio::join!(
            ciclo.alternar_timer(&id, &ana),
            ciclo.resolver(&id, &bruno, "feito")
        );
        assert!(resolucao.is_ok(), "a resolução deve ser gravada");
        if let Err(e) = retomada {
            assert!(matches!(e, ChamadoError::TransicaoInvalida { .. }));
        }

        let final_ = ciclo.repositorio().obter(&id).await.unwrap();
        assert_eq!(final_.status, StatusChamado::Resolvido);
        assert!(!final_.alguem_rastreando(), "nenhum cronômetro pode seguir correndo");
        assert!(final_.resolvido_em.is_some());
    }

    #[tokio::test]
    async fn test_comentario_depois_de_arquivado_e_barrado() {
        let c = cenario();
        let id = c.ciclo.criar(&c.gestor, novo()).await.unwrap().id;
        c.ciclo.assumir(&id, &c.ana).await.unwrap();
        c.ciclo.resolver(&id, &c.ana, "ok").await.unwrap();
        c.ciclo.aprovar(&id, &c.gestor, None).await.unwrap();

        // atualização montada antes do arquivamento chega depois dele
        let tardia = AtualizacaoChamado::new()
            .guarda(Regra::Comentar, &c.ana)
            .comentario(Comentario {
                texto: "atrasado".to_string(),
                autor_nome: "Ana".to_string(),
                autor_id: "a".to_string(),
                timestamp: c.relogio.agora(),
            });
        c.ciclo.arquivar(&id, &c.gestor).await.unwrap();

        let resultado = c
            .ciclo
            .repositorio()
            .aplicar_atualizacao(&id, tardia, "a", "Ana comentou.")
            .await;
        assert!(matches!(resultado, Err(ChamadoError::Permissao(_))));
        let chamado = c.ciclo.repositorio().obter(&id).await.unwrap();
        assert!(chamado.comentarios.is_empty());
        assert_eq!(chamado.historico.last().unwrap().acao, "Arquivou o chamado");
    }

    #[tokio::test]
    async fn test_definir_executores_para_timer_de_removido() {
        let c = cenario();
        let id = c.ciclo.criar(&c.gestor, novo()).await.unwrap().id;
        c.ciclo.assumir(&id, &c.ana).await.unwrap();
        c.relogio.avancar(30);

        let chamado = c
            .ciclo
            .definir_executores(&id, &c.gestor, &[c.bruno.clone()])
            .await
            .unwrap();
        assert_eq!(chamado.executor_ids, vec!["b".to_string()]);
        assert!(!chamado.esta_rastreando("a"));
        assert_eq!(chamado.tempo_gasto, 30);
        assert_eq!(chamado.status, StatusChamado::Pausado, "ninguém mais trabalhando");
        assert_eq!(
            chamado.historico.last().unwrap().acao,
            "Atualizou responsáveis para: Bruno"
        );

        let chamado = c.ciclo.definir_executores(&id, &c.gestor, &[]).await.unwrap();
        assert!(chamado.executor_ids.is_empty());
        assert_eq!(
            chamado.historico.last().unwrap().acao,
            "Atualizou responsáveis para: Ninguém"
        );
    }

    #[tokio::test]
    async fn test_comentario_gera_historico() {
        let c = cenario();
        let id = c.ciclo.criar(&c.gestor, novo()).await.unwrap().id;

        let chamado = c.ciclo.comentar(&id, &c.ana, "Vou verificar").await.unwrap();
        assert_eq!(chamado.comentarios.len(), 1);
        assert_eq!(chamado.comentarios[0].autor_nome, "Ana");
        assert_eq!(chamado.historico.len(), 2);
        assert_eq!(chamado.historico[1].acao, "Ana comentou.");

        assert!(matches!(
            c.ciclo.comentar(&id, &c.ana, "  ").await,
            Err(ChamadoError::Validacao(_))
        ));
    }

    #[tokio::test]
    async fn test_migracao_tempo_legado() {
        let c = cenario();
        let base = c.ciclo.criar(&c.gestor, novo()).await.unwrap();

        let mut legado = base.clone();
        legado.id = "legado".to_string();
        legado.status = StatusChamado::Aprovado;
        legado.tempo_gasto_horas_legado = Some(2.5);
        c.ciclo.repositorio().importar(legado).await.unwrap();

        let relatorio = c.ciclo.migrar_tempo_legado("admin").await.unwrap();
        assert_eq!(relatorio.chamados_convertidos, 1);
        assert_eq!(relatorio.ids, vec!["legado".to_string()]);

        let chamado = c.ciclo.repositorio().obter("legado").await.unwrap();
        assert_eq!(chamado.tempo_gasto, 9000);
        assert!(chamado.tempo_gasto_horas_legado.is_none());

        // Segunda execução não encontra mais nada
        let relatorio = c.ciclo.migrar_tempo_legado("admin").await.unwrap();
        assert_eq!(relatorio.chamados_convertidos, 0);
    }
}
