// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::{Role, User}};

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users'.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail (login: sem escopo, o e-mail é
    // único globalmente).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca escopada: NULL no escopo significa SuperAdmin (sem filtro).
    pub async fn find_scoped<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(executor)
        .await?;
        Ok(maybe_user)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
    ) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY name ASC",
        )
        .bind(scope)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    // Cria um novo usuário, com tratamento específico para e-mail duplicado.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        avatar: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (company_id, name, email, password_hash, role, avatar)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(avatar)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    // Atualiza os dados cadastrais. A troca de company_id só chega aqui
    // quando o chamador é SuperAdmin (o handler decide).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
        name: &str,
        email: &str,
        role: Role,
        avatar: Option<&str>,
        company_id: Uuid,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $3, email = $4, role = $5, avatar = $6, company_id = $7,
                updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(avatar)
        .bind(company_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            AppError::from(e)
        })?;
        Ok(updated)
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = sqlx::query_as::<_, User>(
            "DELETE FROM users WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2) RETURNING *",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(executor)
        .await?;
        Ok(deleted)
    }
}
