use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::info;

/// Expected capacity and false-positive rate.
/// Tune these based on real user counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;
const CACHE_CAPACITY: u64 = 500_000;
const CACHE_TTL: Duration = Duration::from_secs(86_400);

#[inline]
fn normalize(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Fast path for "is this login username taken" checks.
///
/// The cuckoo filter answers definite negatives, the cache answers recent
/// positives, and the `users` table stays the source of truth.
pub struct UsernameRegistry {
    filter: RwLock<CuckooFilter<String>>,
    taken: Cache<String, bool>,
}

impl Default for UsernameRegistry {
    fn default() -> Self {
        Self::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)
    }
}

impl UsernameRegistry {
    pub fn new(capacity: usize, false_positive_rate: f64) -> Self {
        Self {
            filter: RwLock::new(CuckooFilter::new(capacity, false_positive_rate)),
            taken: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// Check if a username might exist (false positives possible)
    pub fn might_exist(&self, username: &str) -> bool {
        let username = normalize(username);
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&username)
    }

    /// Records a freshly provisioned username in both layers.
    pub async fn mark_taken(&self, username: &str) {
        let username = normalize(username);
        self.filter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(&username);
        self.taken.insert(username, true).await;
    }

    pub async fn is_cached_taken(&self, username: &str) -> bool {
        self.taken.get(&normalize(username)).await.unwrap_or(false)
    }

    /// true  => username AVAILABLE
    /// false => username TAKEN
    pub async fn is_available(&self, username: &str, pool: &MySqlPool) -> Result<bool, sqlx::Error> {
        // 1. cuckoo filter: a miss is definite
        if !self.might_exist(username) {
            return Ok(true);
        }

        // 2. cache: recent positives
        if self.is_cached_taken(username).await {
            return Ok(false);
        }

        // 3. database
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT CAST(EXISTS(SELECT 1 FROM users WHERE LOWER(username) = ?) AS SIGNED)",
        )
        .bind(normalize(username))
        .fetch_one(pool)
        .await?
            != 0;

        if exists {
            self.taken.insert(normalize(username), true).await;
        }

        Ok(!exists)
    }

    /// Loads every username into the filter using streaming + batching.
    pub async fn warmup_filter(&self, pool: &MySqlPool, batch_size: usize) -> Result<usize> {
        let mut stream = sqlx::query_as::<_, (String,)>("SELECT username FROM users").fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            let (username,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
            batch.push(normalize(&username));
            total += 1;

            if batch.len() == batch_size {
                self.insert_batch(&batch);
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.insert_batch(&batch);
        }

        info!(total, "Username filter warmup complete");
        Ok(total)
    }

    /// Loads only users who logged in recently into the cache.
    pub async fn warmup_cache(&self, pool: &MySqlPool, days: u32, batch_size: usize) -> Result<usize> {
        let mut stream = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT username
            FROM users
            WHERE last_login_at >= NOW() - INTERVAL ? DAY
            ORDER BY last_login_at DESC
            "#,
        )
        .bind(days)
        .fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            let (username,) = row?;
            batch.push(normalize(&username));
            total += 1;

            if batch.len() >= batch_size {
                self.cache_batch(&batch).await;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.cache_batch(&batch).await;
        }

        info!(total, days, "Username cache warmup complete");
        Ok(total)
    }

    fn insert_batch(&self, usernames: &[String]) {
        let mut filter = self.filter.write().unwrap_or_else(PoisonError::into_inner);
        for username in usernames {
            filter.add(username);
        }
    }

    async fn cache_batch(&self, usernames: &[String]) {
        let inserts: Vec<_> = usernames
            .iter()
            .map(|u| self.taken.insert(u.clone(), true))
            .collect();
        futures::future::join_all(inserts).await;
    }
}
