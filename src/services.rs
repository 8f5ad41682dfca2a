pub mod agenda_service;
pub mod auth;
pub mod churn_service;
pub mod ciclo;
pub mod comissao_service;
pub mod despesa_service;
pub mod lista_service;
pub mod pagamento_service;
pub mod prospeccao_service;
pub mod relatorio_service;
pub mod usuario_service;
