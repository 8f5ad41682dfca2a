// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,
        handlers::auth::change_password,

        // --- Usuários ---
        handlers::usuarios::list_usuarios,
        handlers::usuarios::get_stats,
        handlers::usuarios::get_usuario,
        handlers::usuarios::create_usuario,
        handlers::usuarios::update_usuario,
        handlers::usuarios::delete_usuario,
        handlers::usuarios::atualizar_flags,
        handlers::usuarios::import_usuarios,

        // --- Agenda ---
        handlers::agenda::list_agenda,
        handlers::agenda::get_stats,
        handlers::agenda::get_item,
        handlers::agenda::create_item,
        handlers::agenda::update_item,
        handlers::agenda::delete_item,
        handlers::agenda::marcar_renovou,
        handlers::agenda::marcar_cancelou,
        handlers::agenda::reverter_renovou,
        handlers::agenda::reverter_cancelou,
        handlers::agenda::atualizar_dias,
        handlers::agenda::sincronizar,

        // --- Churn ---
        handlers::churn::list_churns,
        handlers::churn::get_stats,
        handlers::churn::relatorio_mensal,
        handlers::churn::usuarios_em_churn,
        handlers::churn::get_churn,
        handlers::churn::create_churn,
        handlers::churn::update_churn,
        handlers::churn::delete_churn,
        handlers::churn::reverter_churn,

        // --- Pagamentos ---
        handlers::pagamentos::list_pagamentos,
        handlers::pagamentos::get_stats,
        handlers::pagamentos::relatorio_mensal,
        handlers::pagamentos::get_pagamento,
        handlers::pagamentos::create_pagamento,
        handlers::pagamentos::update_pagamento,
        handlers::pagamentos::delete_pagamento,

        // --- Comissões ---
        handlers::comissoes::list_comissoes,
        handlers::comissoes::get_stats,
        handlers::comissoes::consolidacao_por_indicador,
        handlers::comissoes::relatorio_mensal,
        handlers::comissoes::extrato,
        handlers::comissoes::get_comissao,
        handlers::comissoes::create_comissao,
        handlers::comissoes::update_comissao,
        handlers::comissoes::delete_comissao,

        // --- Despesas ---
        handlers::despesas::list_despesas,
        handlers::despesas::get_stats,
        handlers::despesas::relatorio_por_categoria,
        handlers::despesas::relatorio_mensal,
        handlers::despesas::get_despesa,
        handlers::despesas::create_despesa,
        handlers::despesas::update_despesa,
        handlers::despesas::marcar_paga,
        handlers::despesas::marcar_pendente,
        handlers::despesas::delete_despesa,

        // --- Prospecção ---
        handlers::prospeccao::list_prospeccoes,
        handlers::prospeccao::get_stats,
        handlers::prospeccao::nao_convertidas,
        handlers::prospeccao::get_prospeccao,
        handlers::prospeccao::create_prospeccao,
        handlers::prospeccao::update_prospeccao,
        handlers::prospeccao::delete_prospeccao,
        handlers::prospeccao::converter,

        // --- Listas ---
        handlers::listas::list_agrupadas,
        handlers::listas::list_by_tipo,
        handlers::listas::get_item,
        handlers::listas::create_item,
        handlers::listas::update_item,
        handlers::listas::delete_item,

        // --- Relatórios ---
        handlers::relatorios::dashboard,
        handlers::relatorios::financeiro,
        handlers::relatorios::usuarios,
        handlers::relatorios::desempenho_mensal,
        handlers::relatorios::agenda,

        // --- Operadores e auditoria ---
        handlers::admin_users::list_admins,
        handlers::admin_users::aprovar,
        handlers::admin_users::rejeitar,
        handlers::admin_users::alterar_role,
        handlers::admin_users::toggle_ativo,
        handlers::auditoria::list_auditoria,

        // --- Admin (senha) ---
        handlers::admin::executar_job,
        handlers::admin::status_job,
    ),
    components(
        schemas(
            models::auth::AdminRole,
            models::usuario::StatusFinal,
            models::agenda::StatusAgenda,
            models::agenda::EstadoAgenda,
            models::agenda::JanelaAgenda,
            models::pagamento::MetodoPagamento,
            models::pagamento::RegraTipo,
            models::despesa::StatusDespesa,
            models::lista::TipoLista,
            models::auditoria::AcaoAuditoria,
            models::usuario::ResultadoLinha,
            models::job::ExecucaoJob,
            models::job::ResultadoEtapa,
        )
    ),
    tags(
        (name = "Health", description = "Disponibilidade do serviço"),
        (name = "Auth", description = "Autenticação dos operadores"),
        (name = "Usuarios", description = "Assinantes e importação em lote"),
        (name = "Agenda", description = "Vencimentos, renovações e cancelamentos"),
        (name = "Churn", description = "Cancelamentos e reversões"),
        (name = "Pagamentos", description = "Pagamentos e efeitos no ciclo do usuário"),
        (name = "Comissoes", description = "Comissões dos indicadores"),
        (name = "Despesas", description = "Despesas operacionais"),
        (name = "Prospeccao", description = "Leads e conversão"),
        (name = "Listas", description = "Listas auxiliares (contas, métodos, categorias, indicadores)"),
        (name = "Relatorios", description = "Indicadores e relatórios gerenciais"),
        (name = "Operadores", description = "Gestão de operadores (ADMIN)"),
        (name = "Auditoria", description = "Trilha de auditoria (ADMIN)"),
        (name = "Admin", description = "Rotas operacionais protegidas por senha")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
