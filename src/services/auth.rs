// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    middleware::auth::{ClientMeta, RequestContext},
    models::{
        audit::AuditAction,
        auth::{Claims, Role, User},
    },
    services::audit_service::AuditService,
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    audit_service: AuditService,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        audit_service: AuditService,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            audit_service,
            jwt_secret,
            pool,
        }
    }

    // ---
    // Autenticação
    // ---

    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok((token, user))
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    pub async fn me(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    // ---
    // Gestão de usuários (Admin/SuperAdmin)
    // Mutação + auditoria na MESMA transação.
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        company_id: Uuid,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        avatar: Option<&str>,
    ) -> Result<User, AppError> {
        let hashed_password = self.hash_password(password).await?;

        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create(&mut *tx, company_id, name, email, &hashed_password, role, avatar)
            .await?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Insert,
                "user",
                Some(new_user.id),
                None,
                Some(serde_json::to_value(&new_user).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(new_user)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
        name: &str,
        email: &str,
        role: Role,
        avatar: Option<&str>,
        company_id: Option<Uuid>,
    ) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let before = self
            .user_repo
            .find_scoped(&mut *tx, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        // companyId só muda pela mão do SuperAdmin; para os demais, o
        // vínculo original é mantido.
        let final_company = if ctx.role.is_super_admin() {
            company_id.unwrap_or(before.company_id)
        } else {
            before.company_id
        };

        let updated = self
            .user_repo
            .update(&mut *tx, id, ctx.scope(), name, email, role, avatar, final_company)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Update,
                "user",
                Some(id),
                Some(serde_json::to_value(&before).map_err(anyhow::Error::from)?),
                Some(serde_json::to_value(&updated).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_user(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = self
            .user_repo
            .delete(&mut *tx, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Delete,
                "user",
                Some(id),
                Some(serde_json::to_value(&deleted).map_err(anyhow::Error::from)?),
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Troca de senha self-service: exige a senha atual correta.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        let current = current_password.to_owned();
        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify(&current, &stored_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = self.hash_password(new_password).await?;

        let mut tx = self.pool.begin().await?;
        self.user_repo
            .update_password(&mut *tx, ctx.user_id, &new_hash)
            .await?;

        // O snapshot serializa o documento externo (sem o hash de senha).
        let snapshot = serde_json::to_value(&user).map_err(anyhow::Error::from)?;
        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Update,
                "user",
                Some(ctx.user_id),
                Some(snapshot.clone()),
                Some(snapshot),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
