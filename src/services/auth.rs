// src/services/auth.rs

use std::{collections::HashMap, sync::Arc};

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AdminRepository,
    models::auth::{
        Admin, AdminRole, AuthResponse, ChangePasswordPayload, Claims, LoginPayload, RegisterAdminPayload,
        RegisterResponse,
    },
};

pub const JWT_ISSUER: &str = "financasbuscador";
pub const JWT_AUDIENCE: &str = "financasbuscador-api";

const MSG_CREDENCIAIS_INVALIDAS: &str = "Login ou senha inválidos";

pub fn gerar_token(admin: &Admin, secret: &str, expira_em_dias: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(expira_em_dias);

    let claims = Claims {
        sub: admin.id,
        login: admin.login.clone(),
        role: admin.role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
        iss: JWT_ISSUER.to_owned(),
        aud: JWT_AUDIENCE.to_owned(),
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))?)
}

/// Decodifica e valida assinatura, expiração, emissor e audiência.
pub fn decodificar_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[JWT_ISSUER]);
    validation.set_audience(&[JWT_AUDIENCE]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::unauthorized("Token inválido ou expirado"))
}

/// Tokens revogados no logout, guardados até expirarem. Vive só em memória.
#[derive(Clone, Default)]
pub struct TokenBlacklist {
    revogados: Arc<RwLock<HashMap<String, usize>>>,
}

impl TokenBlacklist {
    pub async fn revogar(&self, token: &str, exp: usize) {
        let agora = Utc::now().timestamp() as usize;
        let mut revogados = self.revogados.write().await;
        revogados.retain(|_, expira| *expira > agora);
        revogados.insert(token.to_owned(), exp);
    }

    pub async fn is_revogado(&self, token: &str) -> bool {
        self.revogados.read().await.contains_key(token)
    }
}

#[derive(Clone)]
pub struct AuthService {
    admin_repo: AdminRepository,
    jwt_secret: String,
    jwt_expira_em_dias: i64,
    blacklist: TokenBlacklist,
    pool: PgPool,
}

impl AuthService {
    pub fn new(admin_repo: AdminRepository, jwt_secret: String, jwt_expira_em_dias: i64, pool: PgPool) -> Self {
        Self { admin_repo, jwt_secret, jwt_expira_em_dias, blacklist: TokenBlacklist::default(), pool }
    }

    async fn hash_senha(password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn senha_confere(password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password_clone = password.to_owned();
        let hash_clone = password_hash.to_owned();
        // Executa a verificação em um thread separado
        let valida = tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
        Ok(valida)
    }

    /// O primeiro cadastro vira ADMIN já aprovado; os demais aguardam aprovação.
    pub async fn register(&self, payload: &RegisterAdminPayload) -> Result<RegisterResponse, AppError> {
        let hashed_password = Self::hash_senha(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        // Serializa cadastros concorrentes para que só um seja o "primeiro"
        sqlx::query("LOCK TABLE admins IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let primeiro = self.admin_repo.count(&mut *tx).await? == 0;
        let role = if primeiro { AdminRole::Admin } else { AdminRole::User };

        let admin = self
            .admin_repo
            .create(
                &mut *tx,
                payload.login.trim(),
                &hashed_password,
                payload.nome.trim(),
                payload.email.as_deref().map(str::trim),
                role,
                primeiro,
            )
            .await?;

        tx.commit().await?;

        if primeiro {
            tracing::info!("🔑 Primeiro administrador cadastrado: {}", admin.login);
            let token = gerar_token(&admin, &self.jwt_secret, self.jwt_expira_em_dias)?;
            return Ok(RegisterResponse { admin, token: Some(token), aguardando_aprovacao: false });
        }

        tracing::info!("📝 Cadastro de {} aguardando aprovação", admin.login);
        Ok(RegisterResponse { admin, token: None, aguardando_aprovacao: true })
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse, AppError> {
        let admin = self
            .admin_repo
            .find_by_login(payload.login.trim())
            .await?
            .ok_or_else(|| AppError::unauthorized(MSG_CREDENCIAIS_INVALIDAS))?;

        if !Self::senha_confere(&payload.password, &admin.password_hash).await? {
            return Err(AppError::unauthorized(MSG_CREDENCIAIS_INVALIDAS));
        }
        if !admin.aprovado {
            return Err(AppError::forbidden("Cadastro aguardando aprovação de um administrador"));
        }
        if !admin.ativo {
            return Err(AppError::forbidden("Usuário desativado"));
        }

        let token = gerar_token(&admin, &self.jwt_secret, self.jwt_expira_em_dias)?;
        Ok(AuthResponse { token, admin })
    }

    pub async fn logout(&self, token: &str, exp: usize) {
        self.blacklist.revogar(token, exp).await;
    }

    /// Valida o token e recarrega o operador do banco.
    pub async fn validate_token(&self, token: &str) -> Result<(Admin, Claims), AppError> {
        if self.blacklist.is_revogado(token).await {
            return Err(AppError::unauthorized("Token revogado"));
        }
        let claims = decodificar_token(token, &self.jwt_secret)?;

        let admin = self
            .admin_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("Usuário do token não existe mais"))?;
        if !admin.ativo || !admin.aprovado {
            return Err(AppError::forbidden("Usuário sem acesso ao sistema"));
        }
        Ok((admin, claims))
    }

    pub async fn change_password(&self, admin_id: Uuid, payload: &ChangePasswordPayload) -> Result<(), AppError> {
        let admin = self
            .admin_repo
            .find_by_id(admin_id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        if !Self::senha_confere(&payload.senha_atual, &admin.password_hash).await? {
            return Err(AppError::bad_request("Senha atual incorreta"));
        }

        let novo_hash = Self::hash_senha(&payload.nova_senha).await?;
        self.admin_repo.update_password(admin.id, &novo_hash).await
    }

    // =========================================================================
    //  GESTÃO DE OPERADORES
    // =========================================================================

    pub async fn listar_admins(&self) -> Result<Vec<Admin>, AppError> {
        self.admin_repo.find_all().await
    }

    pub async fn aprovar(&self, id: Uuid) -> Result<Admin, AppError> {
        self.admin_repo
            .set_aprovado(id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))
    }

    /// Rejeitar remove o cadastro pendente. Cadastros aprovados não podem ser rejeitados.
    pub async fn rejeitar(&self, id: Uuid) -> Result<(), AppError> {
        let admin = self
            .admin_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;
        if admin.aprovado {
            return Err(AppError::bad_request("Apenas cadastros pendentes podem ser rejeitados"));
        }
        self.admin_repo.delete(id).await?;
        Ok(())
    }

    pub async fn alterar_role(&self, solicitante: Uuid, id: Uuid, role: AdminRole) -> Result<Admin, AppError> {
        if solicitante == id {
            return Err(AppError::bad_request("Você não pode alterar o seu próprio perfil"));
        }
        self.admin_repo
            .set_role(id, role)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))
    }

    pub async fn toggle_ativo(&self, solicitante: Uuid, id: Uuid) -> Result<Admin, AppError> {
        if solicitante == id {
            return Err(AppError::bad_request("Você não pode desativar a si mesmo"));
        }
        self.admin_repo
            .toggle_ativo(id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste-com-mais-de-32-caracteres";

    fn admin() -> Admin {
        Admin {
            id: Uuid::new_v4(),
            login: "operador".into(),
            password_hash: String::new(),
            nome: "Operador".into(),
            email: None,
            role: AdminRole::Admin,
            aprovado: true,
            ativo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_gerado_e_aceito_com_os_mesmos_claims() {
        let a = admin();
        let token = gerar_token(&a, SECRET, 7).unwrap();
        let claims = decodificar_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, a.id);
        assert_eq!(claims.login, "operador");
        assert_eq!(claims.role, AdminRole::Admin);
        assert_eq!(claims.iss, JWT_ISSUER);
        assert_eq!(claims.aud, JWT_AUDIENCE);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_com_outro_segredo_e_rejeitado() {
        let token = gerar_token(&admin(), SECRET, 7).unwrap();
        let err = decodificar_token(&token, "outro-segredo-com-mais-de-32-caracteres!!").unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        let token = gerar_token(&admin(), SECRET, -2).unwrap();
        assert!(decodificar_token(&token, SECRET).is_err());
    }

    #[tokio::test]
    async fn blacklist_revoga_token() {
        let blacklist = TokenBlacklist::default();
        let exp = (Utc::now().timestamp() + 3600) as usize;

        assert!(!blacklist.is_revogado("abc").await);
        blacklist.revogar("abc", exp).await;
        assert!(blacklist.is_revogado("abc").await);
        assert!(!blacklist.is_revogado("def").await);
    }
}
