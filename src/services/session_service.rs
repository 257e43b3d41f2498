use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::session::{PrincipalClaims, PrincipalKind, Session};
use crate::utils::token::{generate_access_token, token_digest};

pub const SESSION_TOKEN_LEN: usize = 48;

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
    secret: String,
    ttl: Duration,
}

#[derive(sqlx::FromRow)]
struct ClaimRow {
    kind: String,
    principal_id: Uuid,
}

impl SessionService {
    pub fn new(pool: PgPool, secret: String, ttl_hours: i64) -> Self {
        Self {
            pool,
            secret,
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn digest(&self, token: &str) -> String {
        token_digest(token, &self.secret)
    }

    /// Resolves a client token to a live session. Unknown and expired tokens
    /// both yield `None`.
    pub async fn load(&self, token: &str) -> Result<Option<Session>> {
        let token_hash = self.digest(token);
        let expires_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT expires_at FROM sessions WHERE token_hash = $1 AND expires_at > NOW()",
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some(expires_at) = expires_at else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, ClaimRow>(
            "SELECT kind, principal_id FROM session_claims WHERE token_hash = $1",
        )
        .bind(&token_hash)
        .fetch_all(&self.pool)
        .await?;

        let claims: PrincipalClaims = rows
            .into_iter()
            .filter_map(|row| PrincipalKind::parse(&row.kind).map(|k| (k, row.principal_id)))
            .collect();

        Ok(Some(Session {
            token_hash,
            claims,
            expires_at,
        }))
    }

    /// Adds a claim and rotates the token: the existing session (if any) is
    /// replaced by a fresh one carrying its claims plus the new one. Returns
    /// the new client token.
    pub async fn attach(
        &self,
        existing: Option<&Session>,
        kind: PrincipalKind,
        principal_id: Uuid,
    ) -> Result<String> {
        let mut claims = existing.map(|s| s.claims.clone()).unwrap_or_default();
        claims.insert(kind, principal_id);
        self.replace(existing, &claims).await
    }

    /// Drops one claim. A session left without claims is deleted.
    pub async fn detach(&self, session: &Session, kind: PrincipalKind) -> Result<()> {
        sqlx::query("DELETE FROM session_claims WHERE token_hash = $1 AND kind = $2")
            .bind(&session.token_hash)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;

        let mut remaining = session.claims.clone();
        remaining.remove(kind);
        if remaining.is_empty() {
            self.destroy(&session.token_hash).await?;
        }
        Ok(())
    }

    pub async fn destroy(&self, token_hash: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn replace(&self, existing: Option<&Session>, claims: &PrincipalClaims) -> Result<String> {
        let token = generate_access_token(SESSION_TOKEN_LEN);
        let token_hash = self.digest(&token);
        let expires_at = Utc::now() + self.ttl;

        let mut tx = self.pool.begin().await?;
        if let Some(old) = existing {
            sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
                .bind(&old.token_hash)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("INSERT INTO sessions (token_hash, expires_at) VALUES ($1, $2)")
            .bind(&token_hash)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;
        for kind in claims.kinds() {
            if let Some(principal_id) = claims.get(kind) {
                sqlx::query(
                    "INSERT INTO session_claims (token_hash, kind, principal_id) VALUES ($1, $2, $3)",
                )
                .bind(&token_hash)
                .bind(kind.as_str())
                .bind(principal_id)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;

        Ok(token)
    }
}
