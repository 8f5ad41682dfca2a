// src/config.rs

use std::{env, net::SocketAddr, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AdminRepository, AgendaRepository, AuditoriaRepository, ChurnRepository, ComissaoRepository,
        DespesaRepository, ListaRepository, PagamentoRepository, ProspeccaoRepository, RelatorioRepository,
        UsuarioRepository,
    },
    jobs::{AtualizarFlagsJob, JobConfig},
    services::{
        agenda_service::AgendaService, auth::AuthService, churn_service::ChurnService,
        comissao_service::ComissaoService, despesa_service::DespesaService, lista_service::ListaService,
        pagamento_service::PagamentoService, prospeccao_service::ProspeccaoService,
        relatorio_service::RelatorioService, usuario_service::UsuarioService,
    },
};

const JWT_SECRET_MIN: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("variável de ambiente obrigatória ausente: {0}")]
    Missing(&'static str),

    #[error("valor inválido para {0}: {1}")]
    Invalid(&'static str, &'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expira_em_dias: i64,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub job: JobConfig,
    /// Senha do header `x-admin-password`. Sem ela as rotas /api/admin ficam bloqueadas.
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de consulta (ambiente ou mapa nos testes).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < JWT_SECRET_MIN {
            return Err(ConfigError::Invalid("JWT_SECRET", "deve ter no mínimo 32 caracteres"));
        }

        let jwt_expira_em_dias: i64 = lookup("JWT_EXPIRES_IN_DAYS")
            .unwrap_or_else(|| "7".to_string())
            .parse()
            .ok()
            .filter(|d| *d > 0)
            .ok_or(ConfigError::Invalid("JWT_EXPIRES_IN_DAYS", "deve ser um inteiro positivo"))?;

        let bind_addr: SocketAddr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("BIND_ADDR", "deve ser um endereço host:porta"))?;

        let db_max_connections: u32 = lookup("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::Invalid("DB_MAX_CONNECTIONS", "deve ser um inteiro positivo"))?;

        let hora: u32 = lookup("JOB_ATUALIZAR_FLAGS_HORA")
            .unwrap_or_else(|| "0".to_string())
            .parse()
            .ok()
            .filter(|h| *h <= 23)
            .ok_or(ConfigError::Invalid("JOB_ATUALIZAR_FLAGS_HORA", "deve ser uma hora entre 0 e 23"))?;

        let ativo = match lookup("JOB_ATUALIZAR_FLAGS_ATIVO").as_deref().map(str::trim) {
            None | Some("") => true,
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
            Some(_) => return Err(ConfigError::Invalid("JOB_ATUALIZAR_FLAGS_ATIVO", "deve ser true ou false")),
        };

        let admin_password = lookup("ADMIN_IMPORT_PASSWORD").filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expira_em_dias,
            bind_addr,
            db_max_connections,
            job: JobConfig { ativo, hora },
            admin_password,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub auth_service: AuthService,
    pub usuario_service: UsuarioService,
    pub agenda_service: AgendaService,
    pub pagamento_service: PagamentoService,
    pub churn_service: ChurnService,
    pub comissao_service: ComissaoService,
    pub despesa_service: DespesaService,
    pub prospeccao_service: ProspeccaoService,
    pub lista_service: ListaService,
    pub relatorio_service: RelatorioService,
    pub auditoria_repo: AuditoriaRepository,
    pub job: AtualizarFlagsJob,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    /// Monta o gráfico de dependências sobre um pool já aberto.
    pub fn from_pool(db_pool: PgPool, config: Config) -> Self {
        let admin_repo = AdminRepository::new(db_pool.clone());
        let usuario_repo = UsuarioRepository::new(db_pool.clone());
        let agenda_repo = AgendaRepository::new(db_pool.clone());
        let pagamento_repo = PagamentoRepository::new(db_pool.clone());
        let churn_repo = ChurnRepository::new(db_pool.clone());
        let comissao_repo = ComissaoRepository::new(db_pool.clone());
        let despesa_repo = DespesaRepository::new(db_pool.clone());
        let prospeccao_repo = ProspeccaoRepository::new(db_pool.clone());
        let lista_repo = ListaRepository::new(db_pool.clone());
        let relatorio_repo = RelatorioRepository::new(db_pool.clone());
        let auditoria_repo = AuditoriaRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            admin_repo,
            config.jwt_secret.clone(),
            config.jwt_expira_em_dias,
            db_pool.clone(),
        );
        let pagamento_service = PagamentoService::new(
            db_pool.clone(),
            pagamento_repo.clone(),
            usuario_repo.clone(),
            agenda_repo.clone(),
            comissao_repo.clone(),
            auditoria_repo.clone(),
        );
        let usuario_service = UsuarioService::new(
            db_pool.clone(),
            usuario_repo.clone(),
            pagamento_repo.clone(),
            agenda_repo.clone(),
            churn_repo.clone(),
            auditoria_repo.clone(),
        );
        let agenda_service = AgendaService::new(
            db_pool.clone(),
            agenda_repo,
            usuario_repo.clone(),
            pagamento_repo.clone(),
            churn_repo.clone(),
            auditoria_repo.clone(),
            pagamento_service.clone(),
        );
        let churn_service = ChurnService::new(db_pool.clone(), churn_repo, usuario_repo.clone(), auditoria_repo.clone());
        let comissao_service = ComissaoService::new(db_pool.clone(), comissao_repo, pagamento_repo);
        let despesa_service = DespesaService::new(db_pool.clone(), despesa_repo);
        let prospeccao_service = ProspeccaoService::new(db_pool.clone(), prospeccao_repo, usuario_repo);
        let lista_service = ListaService::new(db_pool.clone(), lista_repo);
        let relatorio_service =
            RelatorioService::new(relatorio_repo, usuario_service.clone(), agenda_service.clone());

        let job = AtualizarFlagsJob::new(usuario_service.clone(), agenda_service.clone(), config.job);

        Self {
            db_pool,
            config,
            auth_service,
            usuario_service,
            agenda_service,
            pagamento_service,
            churn_service,
            comissao_service,
            despesa_service,
            prospeccao_service,
            lista_service,
            relatorio_service,
            auditoria_repo,
            job,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "segredo-de-teste-com-mais-de-32-caracteres";

    fn carregar(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let mapa: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| mapa.get(k).cloned())
    }

    #[test]
    fn valores_padrao() {
        let config = carregar(&[("DATABASE_URL", "postgres://localhost/financas"), ("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.jwt_expira_em_dias, 7);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.job, JobConfig { ativo: true, hora: 0 });
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn valores_customizados() {
        let config = carregar(&[
            ("DATABASE_URL", "postgres://db/financas"),
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRES_IN_DAYS", "30"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("JOB_ATUALIZAR_FLAGS_HORA", "3"),
            ("JOB_ATUALIZAR_FLAGS_ATIVO", "false"),
            ("ADMIN_IMPORT_PASSWORD", "s3nha"),
        ])
        .unwrap();

        assert_eq!(config.jwt_expira_em_dias, 30);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.job, JobConfig { ativo: false, hora: 3 });
        assert_eq!(config.admin_password.as_deref(), Some("s3nha"));
    }

    #[test]
    fn obrigatorios_e_invalidos() {
        assert_eq!(carregar(&[("JWT_SECRET", SECRET)]).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
        assert!(matches!(
            carregar(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "curto")]),
            Err(ConfigError::Invalid("JWT_SECRET", _))
        ));
        assert!(matches!(
            carregar(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", SECRET), ("JOB_ATUALIZAR_FLAGS_HORA", "24")]),
            Err(ConfigError::Invalid("JOB_ATUALIZAR_FLAGS_HORA", _))
        ));
    }
}
