use anyhow::{Context, Result};
use autoscale_cuckoo_filter::CuckooFilter;
use futures_util::StreamExt;
use sqlx::SqlitePool;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 10_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

#[inline]
fn normalize(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Probabilistic set of taken usernames. A miss means the name is surely free;
/// a hit still has to be confirmed against the `users` table.
pub struct UsernameFilter {
    inner: RwLock<CuckooFilter<String>>,
}

impl Default for UsernameFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl UsernameFilter {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
        }
    }

    // A panic while holding the lock cannot leave the filter half-written.
    fn read(&self) -> RwLockReadGuard<'_, CuckooFilter<String>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CuckooFilter<String>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// False positives possible, false negatives not.
    pub fn might_exist(&self, username: &str) -> bool {
        self.read().contains(&normalize(username))
    }

    pub fn insert(&self, username: &str) {
        self.write().add(&normalize(username));
    }

    fn insert_batch(&self, usernames: &[String]) {
        let mut filter = self.write();
        for username in usernames {
            filter.add(username);
        }
    }

    /// Streams every username from the database into the filter.
    pub async fn warmup(&self, pool: &SqlitePool, batch_size: usize) -> Result<usize> {
        let mut stream = sqlx::query_as::<_, (String,)>("SELECT username FROM users").fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            let (username,) = row.context("username fetch failed")?;
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

        log::info!("Username filter warmup complete: {} users", total);
        Ok(total)
    }
}
