// src/db/user_repository.rs
// DOCUMENTATION: User and token database operations
// PURPOSE: Account storage and token lookup for authentication

use crate::errors::{db_error, ApiError};
use crate::models::{AuthToken, User};
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, email, name, password, is_active, is_staff, is_superuser, \
                            last_login, date_joined";

/// Fields for a new account; the password is already hashed
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub is_staff: bool,
    pub is_superuser: bool,
}

fn map_write_error(context: &str, e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::AlreadyExists("user with this email already exists.".to_string())
        }
        _ => db_error(context, e),
    }
}

pub struct UserRepository;

impl UserRepository {
    /// Insert a new user
    /// DOCUMENTATION: A duplicate email surfaces as AlreadyExists
    pub async fn create(pool: &PgPool, new_user: &NewUser<'_>) -> Result<User, ApiError> {
        let sql = format!(
            r#"
            INSERT INTO users (email, name, password, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(new_user.email)
            .bind(new_user.name)
            .bind(new_user.password_hash)
            .bind(new_user.is_staff)
            .bind(new_user.is_superuser)
            .fetch_one(pool)
            .await
            .map_err(|e| map_write_error("Create user failed", e))?;

        log::info!("Created user with id: {}", user.id);
        Ok(user)
    }

    pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<User, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch user failed", e))?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch user by email failed", e))
    }

    /// Overwrite the editable profile fields of a user
    pub async fn update(
        pool: &PgPool,
        id: i64,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, ApiError> {
        let sql = format!(
            r#"
            UPDATE users
            SET email = $1, name = $2, password = $3
            WHERE id = $4
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(name)
            .bind(password_hash)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_write_error("Update user failed", e))?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))
    }

    /// Record a successful login, optionally upgrading the stored hash
    pub async fn record_login(
        pool: &PgPool,
        id: i64,
        new_password_hash: Option<&str>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login = NOW(),
                password = COALESCE($1, password)
            WHERE id = $2
            "#,
        )
        .bind(new_password_hash)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| db_error("Record login failed", e))?;

        Ok(())
    }
}

pub struct TokenRepository;

impl TokenRepository {
    /// Return the user's token, creating it with `key` when none exists
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: i64,
        key: &str,
    ) -> Result<AuthToken, ApiError> {
        // A concurrent insert for the same user is absorbed by ON CONFLICT
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| db_error("Create token failed", e))?;

        sqlx::query_as::<_, AuthToken>(
            "SELECT key, user_id, created FROM auth_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Fetch token failed", e))
    }

    /// Resolve a token key to its owner
    pub async fn find_user_by_key(pool: &PgPool, key: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.name, u.password, u.is_active, u.is_staff,
                   u.is_superuser, u.last_login, u.date_joined
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Token lookup failed", e))
    }
}
