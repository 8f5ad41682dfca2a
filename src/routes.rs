// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{admin::admin_password_guard, auth::auth_guard},
};

pub fn create_router(app_state: AppState) -> Router {
    // Rotas públicas de autenticação
    let auth_public = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    let usuario_routes = Router::new()
        .route("/", get(handlers::usuarios::list_usuarios).post(handlers::usuarios::create_usuario))
        .route("/stats", get(handlers::usuarios::get_stats))
        .route("/import", post(handlers::usuarios::import_usuarios))
        .route(
            "/{id}",
            get(handlers::usuarios::get_usuario)
                .put(handlers::usuarios::update_usuario)
                .delete(handlers::usuarios::delete_usuario),
        )
        .route("/{id}/atualizar-flags", put(handlers::usuarios::atualizar_flags));

    let agenda_routes = Router::new()
        .route("/", get(handlers::agenda::list_agenda).post(handlers::agenda::create_item))
        .route("/stats", get(handlers::agenda::get_stats))
        .route("/atualizar-dias", put(handlers::agenda::atualizar_dias))
        .route("/sincronizar", post(handlers::agenda::sincronizar))
        .route(
            "/{id}",
            get(handlers::agenda::get_item)
                .put(handlers::agenda::update_item)
                .delete(handlers::agenda::delete_item),
        )
        .route("/{id}/renovou", put(handlers::agenda::marcar_renovou))
        .route("/{id}/cancelou", put(handlers::agenda::marcar_cancelou))
        .route("/{id}/reverter-renovou", put(handlers::agenda::reverter_renovou))
        .route("/{id}/reverter-cancelou", put(handlers::agenda::reverter_cancelou));

    let churn_routes = Router::new()
        .route("/", get(handlers::churn::list_churns).post(handlers::churn::create_churn))
        .route("/stats", get(handlers::churn::get_stats))
        .route("/relatorio/mensal", get(handlers::churn::relatorio_mensal))
        .route("/usuarios-em-churn", get(handlers::churn::usuarios_em_churn))
        .route(
            "/{id}",
            get(handlers::churn::get_churn)
                .put(handlers::churn::update_churn)
                .delete(handlers::churn::delete_churn),
        )
        .route("/{id}/reverter", put(handlers::churn::reverter_churn));

    let pagamento_routes = Router::new()
        .route("/", get(handlers::pagamentos::list_pagamentos).post(handlers::pagamentos::create_pagamento))
        .route("/stats", get(handlers::pagamentos::get_stats))
        .route("/relatorio/mensal", get(handlers::pagamentos::relatorio_mensal))
        .route(
            "/{id}",
            get(handlers::pagamentos::get_pagamento)
                .put(handlers::pagamentos::update_pagamento)
                .delete(handlers::pagamentos::delete_pagamento),
        );

    let comissao_routes = Router::new()
        .route("/", get(handlers::comissoes::list_comissoes).post(handlers::comissoes::create_comissao))
        .route("/stats", get(handlers::comissoes::get_stats))
        .route("/consolidacao/indicador", get(handlers::comissoes::consolidacao_por_indicador))
        .route("/relatorio/mensal", get(handlers::comissoes::relatorio_mensal))
        .route("/extrato/{indicador}", get(handlers::comissoes::extrato))
        .route(
            "/{id}",
            get(handlers::comissoes::get_comissao)
                .put(handlers::comissoes::update_comissao)
                .delete(handlers::comissoes::delete_comissao),
        );

    let despesa_routes = Router::new()
        .route("/", get(handlers::despesas::list_despesas).post(handlers::despesas::create_despesa))
        .route("/stats", get(handlers::despesas::get_stats))
        .route("/relatorio/categoria", get(handlers::despesas::relatorio_por_categoria))
        .route("/relatorio/mensal", get(handlers::despesas::relatorio_mensal))
        .route(
            "/{id}",
            get(handlers::despesas::get_despesa)
                .put(handlers::despesas::update_despesa)
                .delete(handlers::despesas::delete_despesa),
        )
        .route("/{id}/pagar", put(handlers::despesas::marcar_paga))
        .route("/{id}/pendente", put(handlers::despesas::marcar_pendente));

    let prospeccao_routes = Router::new()
        .route("/", get(handlers::prospeccao::list_prospeccoes).post(handlers::prospeccao::create_prospeccao))
        .route("/stats", get(handlers::prospeccao::get_stats))
        .route("/nao-convertidas", get(handlers::prospeccao::nao_convertidas))
        .route(
            "/{id}",
            get(handlers::prospeccao::get_prospeccao)
                .put(handlers::prospeccao::update_prospeccao)
                .delete(handlers::prospeccao::delete_prospeccao),
        )
        .route("/{id}/converter", post(handlers::prospeccao::converter));

    let lista_routes = Router::new()
        .route("/", get(handlers::listas::list_agrupadas).post(handlers::listas::create_item))
        .route("/tipo/{tipo}", get(handlers::listas::list_by_tipo))
        .route(
            "/{id}",
            get(handlers::listas::get_item)
                .put(handlers::listas::update_item)
                .delete(handlers::listas::delete_item),
        );

    let relatorio_routes = Router::new()
        .route("/dashboard", get(handlers::relatorios::dashboard))
        .route("/financeiro", get(handlers::relatorios::financeiro))
        .route("/usuarios", get(handlers::relatorios::usuarios))
        .route("/desempenho-mensal", get(handlers::relatorios::desempenho_mensal))
        .route("/agenda", get(handlers::relatorios::agenda));

    let admin_user_routes = Router::new()
        .route("/", get(handlers::admin_users::list_admins))
        .route("/{id}/aprovar", post(handlers::admin_users::aprovar))
        .route("/{id}/rejeitar", delete(handlers::admin_users::rejeitar))
        .route("/{id}/role", put(handlers::admin_users::alterar_role))
        .route("/{id}/toggle-ativo", put(handlers::admin_users::toggle_ativo));

    // Tudo aqui exige Bearer token
    let protegidas = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::get_me))
        .route("/auth/change-password", post(handlers::auth::change_password))
        .nest("/usuarios", usuario_routes)
        .nest("/agenda", agenda_routes)
        .nest("/churn", churn_routes)
        .nest("/pagamentos", pagamento_routes)
        .nest("/comissoes", comissao_routes)
        .nest("/despesas", despesa_routes)
        .nest("/prospeccao", prospeccao_routes)
        .nest("/listas", lista_routes)
        .nest("/relatorios", relatorio_routes)
        .nest("/admin-users", admin_user_routes)
        .route("/auditoria", get(handlers::auditoria::list_auditoria))
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Operacionais: senha no header em vez de token
    let admin_routes = Router::new()
        .route("/atualizar-flags", post(handlers::admin::executar_job))
        .route("/status", get(handlers::admin::status_job))
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), admin_password_guard));

    let api = Router::new()
        .route("/health", get(handlers::health::health))
        .merge(auth_public)
        .nest("/admin", admin_routes)
        .merge(protegidas);

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
