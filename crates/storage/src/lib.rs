use std::{collections::HashMap, sync::Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

mod sqlite;

pub use sqlite::{
    default_cookie_jar_url, normalize_cookie_jar_url, sqlite_url_for_path, SqliteCookieJar,
};

/// Path scope shared by every identity cookie.
pub const COOKIE_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires_at: DateTime<Utc>,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: COOKIE_PATH.to_string(),
            expires_at: now + lifetime,
        }
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Key/value cookie persistence for attribution identifiers.
///
/// Expired cookies are invisible to readers: `get` and `list` only return
/// entries whose expiry lies after `now`.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get(&self, name: &str, now: DateTime<Utc>) -> Result<Option<String>>;
    async fn put(&self, cookie: Cookie) -> Result<()>;
    async fn list(&self, now: DateTime<Utc>) -> Result<Vec<Cookie>>;
    async fn remove(&self, name: &str) -> Result<bool>;
    async fn clear(&self) -> Result<u64>;

    /// Stores `cookie` unless a live cookie with the same name exists and
    /// returns the value in effect afterwards.
    async fn put_if_absent(&self, cookie: Cookie, now: DateTime<Utc>) -> Result<String> {
        if let Some(existing) = self.get(&cookie.name, now).await? {
            return Ok(existing);
        }
        let value = cookie.value.clone();
        self.put(cookie).await?;
        Ok(value)
    }
}

/// In-process cookie jar. Used by tests and by hosts that opt out of
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    cookies: Mutex<HashMap<String, Cookie>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_cookies<T>(&self, f: impl FnOnce(&mut HashMap<String, Cookie>) -> T) -> Result<T> {
        let mut cookies = self
            .cookies
            .lock()
            .map_err(|_| anyhow!("memory cookie jar lock poisoned"))?;
        Ok(f(&mut cookies))
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn get(&self, name: &str, now: DateTime<Utc>) -> Result<Option<String>> {
        self.with_cookies(|cookies| {
            let live = cookies
                .get(name)
                .map(|cookie| cookie.is_live_at(now))
                .unwrap_or(false);
            if !live {
                cookies.remove(name);
                return None;
            }
            cookies.get(name).map(|cookie| cookie.value.clone())
        })
    }

    async fn put(&self, cookie: Cookie) -> Result<()> {
        self.with_cookies(|cookies| {
            cookies.insert(cookie.name.clone(), cookie);
        })
    }

    async fn list(&self, now: DateTime<Utc>) -> Result<Vec<Cookie>> {
        self.with_cookies(|cookies| {
            let mut live: Vec<Cookie> = cookies
                .values()
                .filter(|cookie| cookie.is_live_at(now))
                .cloned()
                .collect();
            live.sort_by(|a, b| a.name.cmp(&b.name));
            live
        })
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        self.with_cookies(|cookies| cookies.remove(name).is_some())
    }

    async fn clear(&self) -> Result<u64> {
        self.with_cookies(|cookies| {
            let removed = cookies.len() as u64;
            cookies.clear();
            removed
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
