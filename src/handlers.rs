pub mod admin;
pub mod admin_users;
pub mod agenda;
pub mod auditoria;
pub mod auth;
pub mod churn;
pub mod comissoes;
pub mod despesas;
pub mod health;
pub mod listas;
pub mod pagamentos;
pub mod prospeccao;
pub mod relatorios;
pub mod usuarios;
