//! Fluxos de pagamento, renovação e cancelamento contra um Postgres real.

mod common;

use financas_backend::{
    common::{date_utils::hoje, error::AppError},
    models::{
        agenda::{MarcarRenovouPayload, StatusAgenda},
        comissao::Comissao,
        pagamento::{MetodoPagamento, RegraTipo},
        usuario::StatusFinal,
    },
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use common::{daqui_a, novo_item_agenda, novo_usuario, pagamento, test_state};

macro_rules! skip_if_no_db {
    () => {
        if std::env::var("TEST_DATABASE_URL").is_err() {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        }
    };
}

async fn comissoes_do_pagamento(pool: &PgPool, pagamento_id: Uuid) -> Vec<Comissao> {
    sqlx::query_as::<_, Comissao>("SELECT * FROM comissoes WHERE pagamento_id = $1")
        .bind(pagamento_id)
        .fetch_all(pool)
        .await
        .unwrap()
}

fn renovacao() -> MarcarRenovouPayload {
    MarcarRenovouPayload {
        data_pagto: hoje(),
        valor: Decimal::from(150),
        metodo: MetodoPagamento::Pix,
        conta: "Nubank".to_string(),
        regra_valor: None,
        elegivel_comissao: None,
        observacao: None,
    }
}

#[tokio::test]
async fn primeiro_pagamento_ativa_usuario() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, None).await;
    assert_eq!(usuario.status_final, StatusFinal::Inativo);

    let pago = state
        .pagamento_service
        .create(&state.db_pool, &pagamento(usuario.id, RegraTipo::Primeiro), None)
        .await
        .unwrap();
    assert!(pago.agenda_id.is_none());

    let detalhe = state.usuario_service.find_by_id(usuario.id).await.unwrap();
    assert_eq!(detalhe.usuario.status_final, StatusFinal::Ativo);
    assert_eq!(detalhe.usuario.ciclo, 1);
    assert!(detalhe.usuario.entrou);
    assert!(detalhe.usuario.ativo_atual);
    assert!(!detalhe.usuario.em_atraso);
    assert_eq!(detalhe.pagamentos.len(), 1);
}

#[tokio::test]
async fn recorrente_sem_item_pendente_e_rejeitado() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, None).await;
    let err = state
        .pagamento_service
        .create(&state.db_pool, &pagamento(usuario.id, RegraTipo::Recorrente), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));

    // Nada foi gravado
    let detalhe = state.usuario_service.find_by_id(usuario.id).await.unwrap();
    assert!(detalhe.pagamentos.is_empty());
    assert_eq!(detalhe.usuario.ciclo, 0);
}

#[tokio::test]
async fn recorrente_renova_o_item_pendente() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, None).await;
    state
        .pagamento_service
        .create(&state.db_pool, &pagamento(usuario.id, RegraTipo::Primeiro), None)
        .await
        .unwrap();
    let item = novo_item_agenda(&state, usuario.id, daqui_a(3)).await;

    let pago = state
        .pagamento_service
        .create(&state.db_pool, &pagamento(usuario.id, RegraTipo::Recorrente), None)
        .await
        .unwrap();
    assert_eq!(pago.agenda_id, Some(item.id));

    let item = state.agenda_service.find_by_id(item.id).await.unwrap();
    assert!(item.renovou);
    assert!(!item.cancelou);

    let detalhe = state.usuario_service.find_by_id(usuario.id).await.unwrap();
    assert_eq!(detalhe.usuario.ciclo, 2);
    assert!(detalhe.usuario.renovou);
}

#[tokio::test]
async fn segundo_item_pendente_e_conflito() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, None).await;
    novo_item_agenda(&state, usuario.id, daqui_a(5)).await;

    let payload = financas_backend::models::agenda::CreateAgendaPayload {
        usuario_id: usuario.id,
        data_venc: daqui_a(35),
        ciclo: Some(2),
        status: Some(StatusAgenda::Ativo),
    };
    let err = state.agenda_service.create(&state.db_pool, &payload).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn renovar_pela_agenda_e_depois_cancelar_desfaz_o_pagamento() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, Some("Carlos")).await;
    state
        .pagamento_service
        .create(&state.db_pool, &pagamento(usuario.id, RegraTipo::Primeiro), None)
        .await
        .unwrap();
    let item = novo_item_agenda(&state, usuario.id, daqui_a(2)).await;

    let renovado = state
        .agenda_service
        .marcar_renovou(&state.db_pool, item.id, &renovacao(), None)
        .await
        .unwrap();
    assert!(renovado.agenda.renovou);
    assert_eq!(renovado.pagamento.regra_tipo, RegraTipo::Recorrente);
    assert_eq!(renovado.pagamento.agenda_id, Some(item.id));

    // Renovar de novo o mesmo item não é permitido
    let err = state
        .agenda_service
        .marcar_renovou(&state.db_pool, item.id, &renovacao(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let cancelado = state
        .agenda_service
        .marcar_cancelou(&state.db_pool, item.id, Some("Sem interesse"), None)
        .await
        .unwrap();
    assert!(cancelado.pagamento_revertido);
    assert!(cancelado.agenda.cancelou);
    assert!(!cancelado.agenda.renovou);
    assert_eq!(cancelado.agenda.status, StatusAgenda::Inativo);
    assert_eq!(cancelado.churn.motivo.as_deref(), Some("Sem interesse"));

    let detalhe = state.usuario_service.find_by_id(usuario.id).await.unwrap();
    assert_eq!(detalhe.pagamentos.len(), 1);
    assert_eq!(detalhe.usuario.status_final, StatusFinal::Inativo);
    assert!(detalhe.usuario.churn);
    assert!(!detalhe.usuario.ativo_atual);
}

#[tokio::test]
async fn excluir_pagamento_recorrente_limpa_a_renovacao_da_agenda() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, None).await;
    state
        .pagamento_service
        .create(&state.db_pool, &pagamento(usuario.id, RegraTipo::Primeiro), None)
        .await
        .unwrap();
    let item = novo_item_agenda(&state, usuario.id, daqui_a(4)).await;

    let renovado = state
        .agenda_service
        .marcar_renovou(&state.db_pool, item.id, &renovacao(), None)
        .await
        .unwrap();

    state
        .pagamento_service
        .delete(&state.db_pool, renovado.pagamento.id, None)
        .await
        .unwrap();

    let item = state.agenda_service.find_by_id(item.id).await.unwrap();
    assert!(!item.renovou);
    assert!(item.is_pendente());

    let detalhe = state.usuario_service.find_by_id(usuario.id).await.unwrap();
    assert_eq!(detalhe.usuario.ciclo, 1);
    assert!(!detalhe.usuario.renovou);
}

#[tokio::test]
async fn excluir_unico_pagamento_reseta_usuario() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, None).await;
    let pago = state
        .pagamento_service
        .create(&state.db_pool, &pagamento(usuario.id, RegraTipo::Primeiro), None)
        .await
        .unwrap();

    state.pagamento_service.delete(&state.db_pool, pago.id, None).await.unwrap();

    let detalhe = state.usuario_service.find_by_id(usuario.id).await.unwrap();
    assert_eq!(detalhe.usuario.status_final, StatusFinal::Inativo);
    assert_eq!(detalhe.usuario.ciclo, 0);
    assert!(!detalhe.usuario.entrou);
    assert!(detalhe.usuario.data_pagto.is_none());
}

#[tokio::test]
async fn reverter_cancelou_com_outro_pendente_e_conflito() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, None).await;
    let item = novo_item_agenda(&state, usuario.id, daqui_a(1)).await;
    state
        .agenda_service
        .marcar_cancelou(&state.db_pool, item.id, None, None)
        .await
        .unwrap();

    // Com o primeiro inativo, um novo item pendente pode ser criado
    novo_item_agenda(&state, usuario.id, daqui_a(30)).await;

    let err = state
        .agenda_service
        .reverter_cancelou(&state.db_pool, item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn reverter_churn_reativa_apenas_com_vencimento_futuro() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, None).await;
    let item = novo_item_agenda(&state, usuario.id, daqui_a(1)).await;
    let cancelado = state
        .agenda_service
        .marcar_cancelou(&state.db_pool, item.id, None, None)
        .await
        .unwrap();

    let reversao = state
        .churn_service
        .reverter_churn(&state.db_pool, cancelado.churn.id, None)
        .await
        .unwrap();
    assert!(reversao.churn.revertido);
    assert!(!reversao.usuario.churn);
    // Sem pagamento não há vencimento: continua inativo
    assert!(!reversao.reativado);
    assert!(!reversao.usuario.ativo_atual);

    let err = state
        .churn_service
        .reverter_churn(&state.db_pool, cancelado.churn.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn cancelar_item_nao_desfaz_renovacao_de_outro_item() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, None).await;
    state
        .pagamento_service
        .create(&state.db_pool, &pagamento(usuario.id, RegraTipo::Primeiro), None)
        .await
        .unwrap();

    let item_a = novo_item_agenda(&state, usuario.id, daqui_a(2)).await;
    let renovacao_a = state
        .agenda_service
        .marcar_renovou(&state.db_pool, item_a.id, &renovacao(), None)
        .await
        .unwrap();

    // B fica pendente, então excluir o pagamento de A mantém A como renovado
    let item_b = novo_item_agenda(&state, usuario.id, daqui_a(32)).await;
    state
        .pagamento_service
        .delete(&state.db_pool, renovacao_a.pagamento.id, None)
        .await
        .unwrap();
    assert!(state.agenda_service.find_by_id(item_a.id).await.unwrap().renovou);

    let renovacao_b = state
        .agenda_service
        .marcar_renovou(&state.db_pool, item_b.id, &renovacao(), None)
        .await
        .unwrap();

    let cancelado = state
        .agenda_service
        .marcar_cancelou(&state.db_pool, item_a.id, None, None)
        .await
        .unwrap();
    assert!(!cancelado.pagamento_revertido);
    assert!(cancelado.agenda.cancelou);

    // O pagamento de B continua lá e B segue renovado
    let pagamento_b = state.pagamento_service.find_by_id(renovacao_b.pagamento.id).await.unwrap();
    assert_eq!(pagamento_b.agenda_id, Some(item_b.id));
    assert!(state.agenda_service.find_by_id(item_b.id).await.unwrap().renovou);

    let detalhe = state.usuario_service.find_by_id(usuario.id).await.unwrap();
    assert_eq!(detalhe.pagamentos.len(), 2);
}

#[tokio::test]
async fn primeiro_pagamento_com_indicador_gera_comissao_removida_junto_com_o_pagamento() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, Some("João")).await;
    let mut payload = pagamento(usuario.id, RegraTipo::Primeiro);
    payload.regra_valor = Some(Decimal::from(100));

    let pago = state.pagamento_service.create(&state.db_pool, &payload, None).await.unwrap();
    assert!(pago.elegivel_comissao);
    assert_eq!(pago.comissao_valor, Some(Decimal::from(100)));

    let comissoes = comissoes_do_pagamento(&state.db_pool, pago.id).await;
    assert_eq!(comissoes.len(), 1);
    assert_eq!(comissoes[0].indicador, "João");
    assert_eq!(comissoes[0].valor, Decimal::from(100));
    assert_eq!(comissoes[0].regra_tipo, RegraTipo::Primeiro);
    assert_eq!(comissoes[0].mes_ref, pago.mes_pagto);

    state.pagamento_service.delete(&state.db_pool, pago.id, None).await.unwrap();
    assert!(comissoes_do_pagamento(&state.db_pool, pago.id).await.is_empty());
}

#[tokio::test]
async fn indicador_direto_nao_gera_comissao() {
    skip_if_no_db!();
    let Some(state) = test_state().await else {
        eprintln!("Skipping test: failed to create test state");
        return;
    };

    let usuario = novo_usuario(&state, Some("Direto")).await;
    let mut payload = pagamento(usuario.id, RegraTipo::Primeiro);
    payload.regra_valor = Some(Decimal::from(100));

    let pago = state.pagamento_service.create(&state.db_pool, &payload, None).await.unwrap();
    assert!(!pago.elegivel_comissao);
    assert!(pago.comissao_valor.is_none());
    assert!(comissoes_do_pagamento(&state.db_pool, pago.id).await.is_empty());
}
