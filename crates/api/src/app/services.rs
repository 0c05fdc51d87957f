//! Infrastructure wiring for the binary.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use grails_auth::{AuthUser, Role, UserId, UserRecord, UserResolver};

/// Loads a user's role from the `users` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgUserResolver;

#[async_trait]
impl UserResolver<PgPool> for PgUserResolver {
    async fn resolve(&self, pool: &PgPool, user_id: UserId) -> anyhow::Result<Box<dyn AuthUser>> {
        let id = i64::try_from(user_id.get()).context("user id does not fit a BIGINT")?;

        let row = sqlx::query("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("querying users")?
            .ok_or_else(|| anyhow::anyhow!("user {user_id} not found"))?;

        let role: String = row.try_get("role").context("reading users.role")?;

        Ok(Box::new(UserRecord {
            id: user_id,
            role: Role::from(role),
        }))
    }
}
