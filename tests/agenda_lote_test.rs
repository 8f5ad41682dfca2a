//! Rotinas em lote da agenda e o job diário contra um Postgres real.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Duration;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use financas_backend::{
    common::date_utils::hoje,
    config::AppState,
    db::AdminRepository,
    models::{
        agenda::{Agenda, MarcarRenovouPayload},
        auth::AdminRole,
        pagamento::{MetodoPagamento, RegraTipo},
        usuario::{StatusFinal, Usuario},
    },
    routes::create_router,
    services::auth::gerar_token,
};

use common::{daqui_a, novo_item_agenda, novo_usuario, pagamento, test_state, JWT_SECRET};

macro_rules! skip_if_no_db {
    () => {
        if std::env::var("TEST_DATABASE_URL").is_err() {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        }
    };
}

async fn itens_do_usuario(pool: &PgPool, usuario_id: Uuid) -> Vec<Agenda> {
    sqlx::query_as::<_, Agenda>("SELECT * FROM agenda WHERE usuario_id = $1 ORDER BY created_at")
        .bind(usuario_id)
        .fetch_all(pool)
        .await
        .unwrap()
}

async fn recarregar(state: &AppState, usuario_id: Uuid) -> Usuario {
    state.usuario_service.find_by_id(usuario_id).await.unwrap().usuario
}

/// Usuário com PRIMEIRO pago há `dias_atras` dias.
async fn usuario_pagante(state: &AppState, dias_atras: i64) -> Usuario {
    let usuario = novo_usuario(state, None).await;
    let mut payload = pagamento(usuario.id, RegraTipo::Primeiro);
    payload.data_pagto = hoje() - Duration::days(dias_atras);
    state.pagamento_service.create(&state.db_pool, &payload, None).await.unwrap();
    recarregar(state, usuario.id).await
}

async fn token_de_operador(state: &AppState) -> String {
    let admin = AdminRepository::new(state.db_pool.clone())
        .create(
            &state.db_pool,
            &format!("operador-{}", Uuid::new_v4()),
            "hash-irrelevante",
            "Operador de Teste",
            None,
            AdminRole::Admin,
            true,
        )
        .await
        .unwrap();
    gerar_token(&admin, JWT_SECRET, 1).unwrap()
}

#[tokio::test]
async fn atualizar_dias_pela_rota_inclui_itens_renovados() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = usuario_pagante(&state, 0).await;
    let item = novo_item_agenda(&state, usuario.id, daqui_a(3)).await;
    let renovacao = MarcarRenovouPayload {
        data_pagto: hoje(),
        valor: Decimal::from(150),
        metodo: MetodoPagamento::Pix,
        conta: "Nubank".to_string(),
        regra_valor: None,
        elegivel_comissao: None,
        observacao: None,
    };
    state
        .agenda_service
        .marcar_renovou(&state.db_pool, item.id, &renovacao, None)
        .await
        .unwrap();

    sqlx::query("UPDATE agenda SET dias_para_vencer = 99 WHERE id = $1")
        .bind(item.id)
        .execute(&state.db_pool)
        .await
        .unwrap();

    // A etapa do job olha só os pendentes
    state.agenda_service.atualizar_dias_para_vencer(true).await.unwrap();
    assert_eq!(state.agenda_service.find_by_id(item.id).await.unwrap().dias_para_vencer, 99);

    let token = token_de_operador(&state).await;
    let response = create_router(state.clone())
        .oneshot(
            Request::put("/api/agenda/atualizar-dias")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let item = state.agenda_service.find_by_id(item.id).await.unwrap();
    assert!(item.renovou);
    assert_eq!(item.dias_para_vencer, 3);
}

#[tokio::test]
async fn sincronizar_cria_item_e_segunda_execucao_nao_altera() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = usuario_pagante(&state, 0).await;
    assert!(itens_do_usuario(&state.db_pool, usuario.id).await.is_empty());

    state.agenda_service.sincronizar_agenda().await.unwrap();

    let itens = itens_do_usuario(&state.db_pool, usuario.id).await;
    assert_eq!(itens.len(), 1);
    assert_eq!(Some(itens[0].data_venc), usuario.data_venc);
    assert_eq!(itens[0].dias_para_vencer, 30);
    assert_eq!(itens[0].ciclo, 1);
    assert!(itens[0].is_pendente());

    state.agenda_service.sincronizar_agenda().await.unwrap();

    let depois = itens_do_usuario(&state.db_pool, usuario.id).await;
    assert_eq!(depois.len(), 1);
    assert_eq!(depois[0].id, itens[0].id);
    assert_eq!(depois[0].updated_at, itens[0].updated_at);
}

#[tokio::test]
async fn sincronizar_corrige_item_com_vencimento_divergente() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = usuario_pagante(&state, 0).await;
    let item = novo_item_agenda(&state, usuario.id, daqui_a(25)).await;

    state.agenda_service.sincronizar_agenda().await.unwrap();

    let itens = itens_do_usuario(&state.db_pool, usuario.id).await;
    assert_eq!(itens.len(), 1);
    assert_eq!(itens[0].id, item.id);
    assert_eq!(Some(itens[0].data_venc), usuario.data_venc);
    assert_eq!(itens[0].dias_para_vencer, 30);
}

#[tokio::test]
async fn sincronizar_isola_falha_de_um_usuario() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let com_falha = usuario_pagante(&state, 0).await;
    let saudavel = usuario_pagante(&state, 0).await;

    // Inserções na agenda falham só para este usuário
    let nome = format!("falha_agenda_{}", com_falha.id.simple());
    sqlx::raw_sql(&format!(
        r#"
        CREATE FUNCTION {nome}() RETURNS trigger AS $$
        BEGIN
            RAISE EXCEPTION 'agenda indisponível';
        END
        $$ LANGUAGE plpgsql;
        CREATE TRIGGER {nome} BEFORE INSERT ON agenda
            FOR EACH ROW WHEN (NEW.usuario_id = '{id}'::uuid)
            EXECUTE FUNCTION {nome}();
        "#,
        id = com_falha.id
    ))
    .execute(&state.db_pool)
    .await
    .unwrap();

    let resultado = state.agenda_service.sincronizar_agenda().await;

    sqlx::raw_sql(&format!("DROP TRIGGER {nome} ON agenda; DROP FUNCTION {nome}();"))
        .execute(&state.db_pool)
        .await
        .unwrap();

    let resultado = resultado.unwrap();
    assert!(resultado.erros >= 1);
    assert!(itens_do_usuario(&state.db_pool, com_falha.id).await.is_empty());
    assert_eq!(itens_do_usuario(&state.db_pool, saudavel.id).await.len(), 1);
}

#[tokio::test]
async fn job_marca_vencido_como_em_atraso_e_segunda_execucao_nao_grava() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    // Pago há 31 dias: venceu ontem
    let usuario = usuario_pagante(&state, 31).await;
    assert_eq!(usuario.status_final, StatusFinal::Ativo);
    assert!(!usuario.em_atraso);

    let resultado = state.job.executar_job().await.unwrap();
    assert!(resultado.usuarios.processados >= 1);

    let atualizado = recarregar(&state, usuario.id).await;
    assert_eq!(atualizado.status_final, StatusFinal::EmAtraso);
    assert!(atualizado.em_atraso);
    assert_eq!(atualizado.dias_para_vencer, Some(-1));

    // Em atraso e ainda ativo: a sincronização abre o item da agenda
    let itens = itens_do_usuario(&state.db_pool, usuario.id).await;
    assert_eq!(itens.len(), 1);
    assert_eq!(itens[0].dias_para_vencer, -1);

    state.job.executar_job().await.unwrap();

    let de_novo = recarregar(&state, usuario.id).await;
    assert_eq!(de_novo.updated_at, atualizado.updated_at);
    let itens_de_novo = itens_do_usuario(&state.db_pool, usuario.id).await;
    assert_eq!(itens_de_novo.len(), 1);
    assert_eq!(itens_de_novo[0].updated_at, itens[0].updated_at);

    let status = state.job.status().await;
    assert!(!status.em_execucao);
    assert!(status.ultima_execucao.is_some());
}
