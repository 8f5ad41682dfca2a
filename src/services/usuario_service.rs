// src/services/usuario_service.rs

use std::collections::HashSet;

use serde_json::json;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::{
    common::{date_utils::hoje, error::AppError},
    db::{AgendaRepository, AuditoriaRepository, ChurnRepository, PagamentoRepository, UsuarioRepository},
    models::{
        auditoria::AcaoAuditoria,
        job::ResultadoEtapa,
        usuario::{
            CreateUsuarioPayload, ImportDetalhe, ImportResultado, ImportUsuarioItem, ResultadoLinha, UpdateUsuarioPayload,
            Usuario, UsuarioDetalhe, UsuarioFiltros, UsuarioStats,
        },
    },
    services::ciclo,
};

pub const TAMANHO_LOTE_IMPORTACAO: usize = 50;
const PAGAMENTOS_NO_DETALHE: i64 = 10;

/// Linha da importação que passou na validação.
#[derive(Debug, Clone)]
pub(crate) struct LinhaValida {
    pub linha: usize,
    pub email: String,
    pub item: ImportUsuarioItem,
}

fn detalhe(linha: usize, email: Option<String>, resultado: ResultadoLinha, mensagem: Option<&str>) -> ImportDetalhe {
    ImportDetalhe { linha, email, resultado, mensagem: mensagem.map(str::to_owned) }
}

/// Valida as linhas e descarta emails repetidos dentro do próprio arquivo.
/// Linhas são numeradas a partir de 1.
pub(crate) fn classificar_importacao(itens: &[ImportUsuarioItem]) -> (Vec<LinhaValida>, Vec<ImportDetalhe>) {
    let mut validas = Vec::new();
    let mut detalhes = Vec::new();
    let mut vistos = HashSet::new();

    for (i, item) in itens.iter().enumerate() {
        let linha = i + 1;
        let email = item
            .email_login
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        let nome_ok = item.nome_completo.as_deref().is_some_and(|n| !n.trim().is_empty());

        let Some(email) = email else {
            detalhes.push(detalhe(linha, None, ResultadoLinha::Erro, Some("Email é obrigatório")));
            continue;
        };
        if !email.validate_email() {
            detalhes.push(detalhe(linha, Some(email), ResultadoLinha::Erro, Some("Email inválido")));
            continue;
        }
        if !nome_ok {
            detalhes.push(detalhe(linha, Some(email), ResultadoLinha::Erro, Some("Nome completo é obrigatório")));
            continue;
        }
        if !vistos.insert(email.clone()) {
            detalhes.push(detalhe(linha, Some(email), ResultadoLinha::Ignorado, Some("Email repetido no arquivo")));
            continue;
        }

        let mut item = item.clone();
        item.email_login = Some(email.clone());
        validas.push(LinhaValida { linha, email, item });
    }

    (validas, detalhes)
}

fn consolidar(mut detalhes: Vec<ImportDetalhe>) -> ImportResultado {
    detalhes.sort_by_key(|d| d.linha);
    let contar = |r: ResultadoLinha| detalhes.iter().filter(|d| d.resultado == r).count();
    ImportResultado {
        success: contar(ResultadoLinha::Criado),
        errors: contar(ResultadoLinha::Erro),
        skipped: contar(ResultadoLinha::Ignorado),
        details: detalhes,
    }
}

#[derive(Clone)]
pub struct UsuarioService {
    pool: PgPool,
    usuario_repo: UsuarioRepository,
    pagamento_repo: PagamentoRepository,
    agenda_repo: AgendaRepository,
    churn_repo: ChurnRepository,
    auditoria_repo: AuditoriaRepository,
}

impl UsuarioService {
    pub fn new(
        pool: PgPool,
        usuario_repo: UsuarioRepository,
        pagamento_repo: PagamentoRepository,
        agenda_repo: AgendaRepository,
        churn_repo: ChurnRepository,
        auditoria_repo: AuditoriaRepository,
    ) -> Self {
        Self { pool, usuario_repo, pagamento_repo, agenda_repo, churn_repo, auditoria_repo }
    }

    pub async fn find_all(&self, filtros: &UsuarioFiltros, limit: i64, offset: i64) -> Result<(Vec<Usuario>, i64), AppError> {
        self.usuario_repo.find_all(filtros, limit, offset).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<UsuarioDetalhe, AppError> {
        let usuario = self
            .usuario_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        let pagamentos = self.pagamento_repo.find_by_usuario(&self.pool, id, PAGAMENTOS_NO_DETALHE).await?;
        let agenda = self.agenda_repo.find_by_usuario(&self.pool, id).await?;
        let churns = self.churn_repo.find_by_usuario(&self.pool, id).await?;

        Ok(UsuarioDetalhe { usuario, pagamentos, agenda, churns })
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateUsuarioPayload) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = self.usuario_repo.create(executor, payload).await?;
        tracing::info!("👤 Usuário {} criado ({})", usuario.id, usuario.email_login);
        Ok(usuario)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateUsuarioPayload) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.usuario_repo
            .update(executor, id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid, admin_id: Option<Uuid>) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let usuario = self
            .usuario_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        // agenda, pagamentos, comissões e churns saem por cascade
        self.usuario_repo.delete(&mut *tx, id).await?;

        self.auditoria_repo
            .registrar(
                &mut *tx,
                admin_id,
                AcaoAuditoria::Delete,
                "usuario",
                usuario.id,
                Some(json!({ "emailLogin": usuario.email_login, "nomeCompleto": usuario.nome_completo })),
            )
            .await?;

        tx.commit().await?;
        tracing::info!("🗑️ Usuário {} removido", id);
        Ok(())
    }

    // =========================================================================
    //  FLAGS DE VENCIMENTO
    // =========================================================================

    pub async fn atualizar_flags<'e, E>(&self, executor: E, id: Uuid) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (usuario, _) = self.recalcular_flags(executor, id).await?;
        Ok(usuario)
    }

    /// Retorna o usuário e se houve mudança gravada.
    async fn recalcular_flags<'e, E>(&self, executor: E, id: Uuid) -> Result<(Usuario, bool), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let mut usuario = self
            .usuario_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        let mudou = ciclo::atualizar_flags(&mut usuario, hoje());
        if mudou {
            usuario = self.usuario_repo.salvar_estado(&mut *tx, &usuario).await?;
        }

        tx.commit().await?;
        Ok((usuario, mudou))
    }

    /// Recalcula flags de todos os usuários ATIVO/EM_ATRASO com vencimento.
    pub async fn atualizar_flags_em_lote(&self) -> Result<ResultadoEtapa, AppError> {
        let candidatos = self.usuario_repo.find_com_vencimento(&self.pool).await?;

        let mut resultado = ResultadoEtapa::default();
        for usuario in candidatos {
            resultado.processados += 1;
            match self.recalcular_flags(&self.pool, usuario.id).await {
                Ok((_, true)) => resultado.atualizados += 1,
                Ok((_, false)) => {}
                Err(e) => {
                    resultado.erros += 1;
                    tracing::error!("🔥 Falha ao atualizar flags do usuário {}: {:?}", usuario.id, e);
                }
            }
        }
        Ok(resultado)
    }

    // =========================================================================
    //  IMPORTAÇÃO
    // =========================================================================

    /// Importa usuários em lotes. Emails já cadastrados são ignorados, então
    /// reenviar o mesmo arquivo não duplica nada.
    pub async fn import_bulk(&self, itens: &[ImportUsuarioItem]) -> Result<ImportResultado, AppError> {
        let (validas, mut detalhes) = classificar_importacao(itens);

        for lote in validas.chunks(TAMANHO_LOTE_IMPORTACAO) {
            let emails: Vec<String> = lote.iter().map(|l| l.email.clone()).collect();
            let existentes: HashSet<String> = self
                .usuario_repo
                .emails_existentes(&self.pool, &emails)
                .await?
                .into_iter()
                .collect();

            let novos: Vec<&LinhaValida> = lote.iter().filter(|l| !existentes.contains(&l.email)).collect();
            let itens_novos: Vec<ImportUsuarioItem> = novos.iter().map(|l| l.item.clone()).collect();

            let inseridos: HashSet<String> = if itens_novos.is_empty() {
                HashSet::new()
            } else {
                match self.usuario_repo.create_many(&self.pool, &itens_novos).await {
                    Ok(emails) => emails.into_iter().collect(),
                    Err(e) => {
                        tracing::error!("🔥 Falha ao inserir lote de importação: {:?}", e);
                        for l in &novos {
                            detalhes.push(detalhe(l.linha, Some(l.email.clone()), ResultadoLinha::Erro, Some("Falha ao gravar o lote")));
                        }
                        for l in lote.iter().filter(|l| existentes.contains(&l.email)) {
                            detalhes.push(detalhe(l.linha, Some(l.email.clone()), ResultadoLinha::Ignorado, Some("Email já cadastrado")));
                        }
                        continue;
                    }
                }
            };

            for l in lote {
                let d = if inseridos.contains(&l.email) {
                    detalhe(l.linha, Some(l.email.clone()), ResultadoLinha::Criado, None)
                } else {
                    detalhe(l.linha, Some(l.email.clone()), ResultadoLinha::Ignorado, Some("Email já cadastrado"))
                };
                detalhes.push(d);
            }
        }

        let resultado = consolidar(detalhes);
        tracing::info!(
            "📥 Importação concluída: {} criados, {} ignorados, {} erros",
            resultado.success,
            resultado.skipped,
            resultado.errors
        );
        Ok(resultado)
    }

    pub async fn get_stats(&self) -> Result<UsuarioStats, AppError> {
        self.usuario_repo.stats(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(email: Option<&str>, nome: Option<&str>) -> ImportUsuarioItem {
        ImportUsuarioItem {
            email_login: email.map(str::to_owned),
            nome_completo: nome.map(str::to_owned),
            telefone: None,
            indicador: None,
            obs: None,
        }
    }

    #[test]
    fn classificar_rejeita_linhas_invalidas() {
        let itens = vec![
            item(None, Some("Sem Email")),
            item(Some("nao-e-email"), Some("Fulano")),
            item(Some("ok@exemplo.com"), Some("  ")),
        ];
        let (validas, detalhes) = classificar_importacao(&itens);

        assert!(validas.is_empty());
        assert_eq!(detalhes.len(), 3);
        assert!(detalhes.iter().all(|d| d.resultado == ResultadoLinha::Erro));
        assert_eq!(detalhes[0].linha, 1);
    }

    #[test]
    fn classificar_normaliza_email_e_ignora_repetidos() {
        let itens = vec![
            item(Some(" Ana@Exemplo.com "), Some("Ana")),
            item(Some("ana@exemplo.com"), Some("Ana de Novo")),
            item(Some("bia@exemplo.com"), Some("Bia")),
        ];
        let (validas, detalhes) = classificar_importacao(&itens);

        assert_eq!(validas.len(), 2);
        assert_eq!(validas[0].email, "ana@exemplo.com");
        assert_eq!(validas[0].item.email_login.as_deref(), Some("ana@exemplo.com"));
        assert_eq!(detalhes.len(), 1);
        assert_eq!(detalhes[0].linha, 2);
        assert_eq!(detalhes[0].resultado, ResultadoLinha::Ignorado);
    }

    #[test]
    fn consolidar_conta_por_resultado_e_ordena() {
        let detalhes = vec![
            detalhe(3, None, ResultadoLinha::Erro, Some("x")),
            detalhe(1, None, ResultadoLinha::Criado, None),
            detalhe(2, None, ResultadoLinha::Ignorado, None),
            detalhe(4, None, ResultadoLinha::Criado, None),
        ];
        let r = consolidar(detalhes);
        assert_eq!((r.success, r.skipped, r.errors), (2, 1, 1));
        assert_eq!(r.details.iter().map(|d| d.linha).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }
}
