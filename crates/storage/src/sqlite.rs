use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};

use crate::{Cookie, IdentityStore};

const FALLBACK_COOKIE_JAR_URL: &str = "sqlite://./data/cookies.db";

/// Durable cookie jar backed by a single SQLite table.
#[derive(Clone)]
pub struct SqliteCookieJar {
    pool: Pool<Sqlite>,
}

impl SqliteCookieJar {
    pub async fn open(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid cookie jar url '{database_url}'"))?
            .create_if_missing(true);
        // One connection keeps `sqlite::memory:` jars coherent.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open cookie jar '{database_url}'"))?;

        let jar = Self { pool };
        jar.ensure_cookie_table().await?;
        Ok(jar)
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_cookie_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cookies (
                name          TEXT PRIMARY KEY,
                value         TEXT NOT NULL,
                path          TEXT NOT NULL DEFAULT '/',
                expires_at_ms INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure cookies table exists")?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for SqliteCookieJar {
    async fn get(&self, name: &str, now: DateTime<Utc>) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value, expires_at_ms FROM cookies WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read cookie '{name}'"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at_ms: i64 = row.try_get("expires_at_ms")?;
        if expires_at_ms <= now.timestamp_millis() {
            sqlx::query("DELETE FROM cookies WHERE name = ?")
                .bind(name)
                .execute(&self.pool)
                .await
                .with_context(|| format!("failed to evict expired cookie '{name}'"))?;
            return Ok(None);
        }

        Ok(Some(row.try_get("value")?))
    }

    async fn put(&self, cookie: Cookie) -> Result<()> {
        sqlx::query(
            "INSERT INTO cookies (name, value, path, expires_at_ms) VALUES (?, ?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                path = excluded.path,
                expires_at_ms = excluded.expires_at_ms",
        )
        .bind(&cookie.name)
        .bind(&cookie.value)
        .bind(&cookie.path)
        .bind(cookie.expires_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write cookie '{}'", cookie.name))?;
        Ok(())
    }

    async fn list(&self, now: DateTime<Utc>) -> Result<Vec<Cookie>> {
        let rows = sqlx::query(
            "SELECT name, value, path, expires_at_ms FROM cookies
             WHERE expires_at_ms > ?
             ORDER BY name",
        )
        .bind(now.timestamp_millis())
        .fetch_all(&self.pool)
        .await
        .context("failed to list cookies")?;

        rows.into_iter()
            .map(|row| {
                let expires_at_ms: i64 = row.try_get("expires_at_ms")?;
                let expires_at = DateTime::<Utc>::from_timestamp_millis(expires_at_ms)
                    .ok_or_else(|| anyhow!("cookie expiry out of range: {expires_at_ms}"))?;
                Ok(Cookie {
                    name: row.try_get("name")?,
                    value: row.try_get("value")?,
                    path: row.try_get("path")?,
                    expires_at,
                })
            })
            .collect()
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cookies WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to remove cookie '{name}'"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cookies")
            .execute(&self.pool)
            .await
            .context("failed to clear cookie jar")?;
        Ok(result.rows_affected())
    }
}

/// `<local data dir>/booking/cookies.db`, or `./data/cookies.db` when the
/// platform has no such directory.
pub fn default_cookie_jar_url() -> String {
    match dirs::data_local_dir() {
        Some(dir) => sqlite_url_for_path(&dir.join("booking").join("cookies.db")),
        None => FALLBACK_COOKIE_JAR_URL.to_string(),
    }
}

/// Accepts a bare file path as well as a sqlite URL; blank input selects
/// [`default_cookie_jar_url`].
pub fn normalize_cookie_jar_url(raw: &str) -> String {
    let raw = raw.trim();

    if raw.is_empty() {
        return default_cookie_jar_url();
    }
    if raw.starts_with("sqlite:") || raw.contains("://") {
        return raw.to_string();
    }

    sqlite_url_for_path(Path::new(raw))
}

pub fn sqlite_url_for_path(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for cookie jar url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}
