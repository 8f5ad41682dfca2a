//! Envelope HTTP e guardas de acesso, sem depender do banco.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use financas_backend::routes::create_router;

use common::{lazy_state, ADMIN_PASSWORD};

fn app() -> Router {
    create_router(lazy_state())
}

async fn corpo_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn rota_protegida_sem_token_retorna_401_no_envelope_de_erro() {
    let response = app()
        .oneshot(Request::get("/api/usuarios").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = corpo_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn token_malformado_retorna_401() {
    let response = app()
        .oneshot(
            Request::get("/api/agenda")
                .header("authorization", "Bearer nao-e-um-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(corpo_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn login_invalido_retorna_erros_por_campo() {
    let response = app()
        .oneshot(
            Request::post("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "login": "", "password": "" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = corpo_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["login"].is_array());
    assert!(body["errors"]["password"].is_array());
}

#[tokio::test]
async fn rotas_admin_exigem_a_senha_do_header() {
    let sem_senha = app()
        .oneshot(Request::get("/api/admin/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(sem_senha.status(), StatusCode::UNAUTHORIZED);

    let senha_errada = app()
        .oneshot(
            Request::get("/api/admin/status")
                .header("x-admin-password", "errada")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(senha_errada.status(), StatusCode::FORBIDDEN);
    assert_eq!(corpo_json(senha_errada).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn status_do_job_no_envelope_de_sucesso() {
    let response = app()
        .oneshot(
            Request::get("/api/admin/status")
                .header("x-admin-password", ADMIN_PASSWORD)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = corpo_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["agendamentoAtivo"], false);
    assert_eq!(body["data"]["emExecucao"], false);
    assert!(body["data"]["ultimaExecucao"].is_null());
    assert!(body.get("pagination").is_none());
}

#[tokio::test]
async fn documento_openapi_e_publicado() {
    let response = app()
        .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = corpo_json(response).await;
    assert!(body["paths"]["/api/agenda/{id}/renovou"].is_object());
    assert!(body["components"]["securitySchemes"]["api_jwt"].is_object());
}
