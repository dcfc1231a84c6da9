//! Template persistence

use crate::error::{ReferralError, Result};
use crate::templates::types::{NewTemplate, Template};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Narrow persistence boundary for templates
///
/// Records are only ever replaced as a whole; there is no partial update.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// All templates, oldest first
    async fn list(&self) -> Result<Vec<Template>>;

    async fn get(&self, id: &str) -> Result<Option<Template>>;

    /// Fails with a validation error if any field is blank
    async fn create(&self, template: NewTemplate) -> Result<Template>;

    /// Replace every field of an existing record, keeping its id
    async fn replace(&self, id: &str, template: NewTemplate) -> Result<Template>;

    /// Fails with `NotFound` if the id is absent
    async fn delete(&self, id: &str) -> Result<()>;
}

/// SQLite-backed template store
pub struct SqliteTemplateStore {
    db: SqlitePool,
}

impl SqliteTemplateStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Open (creating if needed) the database and its table
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let db = Self::pool_options(database_url)
            .connect_with(options)
            .await?;

        info!(database_url, "Template store connected");

        let store = Self::new(db);
        store.init_db().await?;
        Ok(store)
    }

    /// Each in-memory connection is its own database, so a memory URL gets
    /// one connection that is never recycled.
    fn pool_options(database_url: &str) -> SqlitePoolOptions {
        if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        }
    }

    /// Initialize the templates table
    pub async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS templates (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                subject TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_templates_created ON templates(created_at)")
            .execute(&self.db)
            .await?;

        Ok(())
    }

    fn row_to_template(row: sqlx::sqlite::SqliteRow) -> Result<Template> {
        use sqlx::Row;

        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Template {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            subject: row.try_get("subject")?,
            body: row.try_get("body")?,
            created_at: parse_timestamp(&created_at, "created_at")?,
            updated_at: parse_timestamp(&updated_at, "updated_at")?,
        })
    }
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ReferralError::Parse(format!("Invalid {} date: {}", column, e)))
}

#[async_trait]
impl TemplateStore for SqliteTemplateStore {
    async fn list(&self) -> Result<Vec<Template>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, subject, body, created_at, updated_at
            FROM templates
            ORDER BY created_at, rowid
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Self::row_to_template).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Template>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, subject, body, created_at, updated_at
            FROM templates
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Self::row_to_template).transpose()
    }

    async fn create(&self, template: NewTemplate) -> Result<Template> {
        template.validate()?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO templates (id, name, subject, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&template.name)
        .bind(&template.subject)
        .bind(&template.body)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        debug!(template_id = %id, name = %template.name, "Template created");

        Ok(Template {
            id,
            name: template.name,
            subject: template.subject,
            body: template.body,
            created_at: now,
            updated_at: now,
        })
    }

    async fn replace(&self, id: &str, template: NewTemplate) -> Result<Template> {
        template.validate()?;

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE templates
            SET name = ?, subject = ?, body = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&template.name)
        .bind(&template.subject)
        .bind(&template.body)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ReferralError::NotFound(format!("Template not found: {}", id)));
        }

        debug!(template_id = %id, "Template replaced");

        self.get(id)
            .await?
            .ok_or_else(|| ReferralError::NotFound("Template disappeared after update".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM templates WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ReferralError::NotFound(format!("Template not found: {}", id)));
        }

        debug!(template_id = %id, "Template deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pool_keeps_its_connection() {
        let store = SqliteTemplateStore::connect("sqlite::memory:").await.unwrap();
        let options = store.db.options();

        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[test]
    fn test_file_pool_uses_default_recycling() {
        let options = SqliteTemplateStore::pool_options("sqlite://referral.db");

        assert_eq!(options.get_max_connections(), 5);
        assert!(options.get_max_lifetime().is_some());
    }
}
