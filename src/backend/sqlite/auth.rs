use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::uuid_column;
use crate::backend::{AuthFailure, AuthService, AuthUser, Credentials, Session};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Lifetime of a password recovery token.
const RECOVERY_TTL_MINUTES: i64 = 60;

/// Email/password accounts with opaque bearer sessions.
#[derive(Clone)]
pub struct SqliteAuth {
    pool: SqlitePool,
    session_ttl: Duration,
    bcrypt_cost: u32,
}

impl SqliteAuth {
    pub fn new(pool: SqlitePool, session_ttl: Duration, bcrypt_cost: u32) -> Self {
        SqliteAuth {
            pool,
            session_ttl,
            bcrypt_cost,
        }
    }

    async fn open_session(&self, user: AuthUser) -> Result<Session, AuthFailure> {
        let access_token = new_token();
        let expires_at = Utc::now() + self.session_ttl;

        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&access_token)
            .bind(user.id.to_string())
            .bind(expires_at.timestamp())
            .execute(&self.pool)
            .await?;

        Ok(Session {
            access_token,
            expires_at: truncate_to_seconds(expires_at),
            user,
        })
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<AuthUser>, AuthFailure> {
        let row = sqlx::query("SELECT id, email FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(AuthUser {
            id: uuid_column(&row, "id")?,
            email: row.try_get("email")?,
        }))
    }
}

#[async_trait]
impl AuthService for SqliteAuth {
    async fn sign_up(&self, credentials: Credentials) -> Result<AuthUser, AuthFailure> {
        let email = normalize_email(&credentials.email)?;
        check_password(&credentials.password)?;

        let password_hash = bcrypt::hash(&credentials.password, self.bcrypt_cost)?;
        let user = AuthUser {
            id: Uuid::new_v4(),
            email,
        };

        let inserted = sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&password_hash)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                log::info!("registered user {}", user.id);
                Ok(user)
            }
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => {
                Err(AuthFailure::Rejected {
                    field: "email",
                    message: "User already registered".to_string(),
                })
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn sign_in(&self, credentials: Credentials) -> Result<Session, AuthFailure> {
        let email = credentials.email.trim().to_lowercase();
        let row = sqlx::query("SELECT id, email, password_hash FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthFailure::InvalidCredentials);
        };
        let password_hash: String = row.try_get("password_hash")?;
        if !bcrypt::verify(&credentials.password, &password_hash)? {
            return Err(AuthFailure::InvalidCredentials);
        }

        let user = AuthUser {
            id: uuid_column(&row, "id")?,
            email: row.try_get("email")?,
        };
        self.open_session(user).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthFailure> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(access_token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<Option<String>, AuthFailure> {
        let user_id: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let token = new_token();
        let expires_at = Utc::now() + Duration::minutes(RECOVERY_TTL_MINUTES);
        sqlx::query("INSERT INTO password_resets (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&token)
            .bind(&user_id)
            .bind(expires_at.timestamp())
            .execute(&self.pool)
            .await?;

        Ok(Some(token))
    }

    async fn redeem_recovery_token(&self, token: &str) -> Result<Session, AuthFailure> {
        let user_id: Option<String> = sqlx::query_scalar(
            "DELETE FROM password_resets WHERE token = $1 AND expires_at > $2 RETURNING user_id",
        )
        .bind(token)
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        let user_id = user_id
            .and_then(|raw| Uuid::parse_str(&raw).ok())
            .ok_or(AuthFailure::InvalidToken)?;
        let user = self
            .find_user(user_id)
            .await?
            .ok_or(AuthFailure::InvalidToken)?;

        self.open_session(user).await
    }

    async fn update_password(&self, user_id: Uuid, password: &str) -> Result<(), AuthFailure> {
        check_password(password)?;
        let password_hash = bcrypt::hash(password, self.bcrypt_cost)?;

        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthFailure::InvalidToken);
        }
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthFailure> {
        let row = sqlx::query(
            "SELECT u.id, u.email FROM sessions AS s JOIN users AS u ON u.id = s.user_id WHERE s.token = $1 AND s.expires_at > $2",
        )
        .bind(access_token)
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(AuthUser {
            id: uuid_column(&row, "id")?,
            email: row.try_get("email")?,
        }))
    }
}

fn new_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn truncate_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}

fn normalize_email(raw: &str) -> Result<String, AuthFailure> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthFailure::Rejected {
            field: "email",
            message: "Unable to validate email address: invalid format".to_string(),
        }),
    }
}

fn check_password(password: &str) -> Result<(), AuthFailure> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthFailure::Rejected {
            field: "password",
            message: format!("Password should be at least {MIN_PASSWORD_LENGTH} characters"),
        });
    }
    Ok(())
}
