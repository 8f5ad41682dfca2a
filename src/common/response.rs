// src/common/response.rs

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const PAGE_PADRAO: i64 = 1;
pub const LIMIT_PADRAO: i64 = 10;
pub const LIMIT_MAXIMO: i64 = 100;

// Envelope de sucesso: { status: "success", data, pagination? }
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { status: "success", message: None, data, pagination: None }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self { status: "success", message: Some(message.into()), data, pagination: None }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self { status: "success", message: None, data, pagination: Some(pagination) }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self { page, limit, total, total_pages }
    }
}

/// Parâmetros `page` e `limit` comuns às listagens.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(PAGE_PADRAO)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|l| *l >= 1)
            .map(|l| l.min(LIMIT_MAXIMO))
            .unwrap_or(LIMIT_PADRAO)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        Pagination::new(self.page(), self.limit(), total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagina_padrao_e_limite_maximo() {
        let q = PageQuery::default();
        assert_eq!((q.page(), q.limit(), q.offset()), (1, 10, 0));

        let q = PageQuery { page: Some(3), limit: Some(500) };
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 200);

        let q = PageQuery { page: Some(0), limit: Some(-2) };
        assert_eq!((q.page(), q.limit()), (1, 10));
    }

    #[test]
    fn total_de_paginas_arredonda_para_cima() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
    }

    #[test]
    fn envelope_de_sucesso_omite_paginacao_ausente() {
        let body = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"], 42);
        assert!(body.get("pagination").is_none());

        let body = serde_json::to_value(ApiResponse::paginated(vec![1], Pagination::new(2, 1, 3))).unwrap();
        assert_eq!(body["pagination"]["totalPages"], 3);
    }
}
