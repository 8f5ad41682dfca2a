pub mod admin_repo;
pub use admin_repo::AdminRepository;
pub mod agenda_repo;
pub use agenda_repo::AgendaRepository;
pub mod auditoria_repo;
pub use auditoria_repo::AuditoriaRepository;
pub mod churn_repo;
pub use churn_repo::ChurnRepository;
pub mod comissao_repo;
pub use comissao_repo::ComissaoRepository;
pub mod despesa_repo;
pub use despesa_repo::DespesaRepository;
pub mod lista_repo;
pub use lista_repo::ListaRepository;
pub mod pagamento_repo;
pub use pagamento_repo::PagamentoRepository;
pub mod prospeccao_repo;
pub use prospeccao_repo::ProspeccaoRepository;
pub mod relatorio_repo;
pub use relatorio_repo::RelatorioRepository;
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
