use anyhow::{Context, Result};
use futures_util::future::join_all;
use futures_util::stream::{self, Stream, TryStreamExt};
use std::sync::Arc;

use crate::kv::KvStore;
use crate::models::{Booking, BOOKING_KEY_PREFIX};

/// Booking persistence on top of a key-value backend
#[derive(Clone)]
pub struct BookingStore {
    kv: Arc<dyn KvStore>,
}

impl BookingStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Write one booking under `booking:<id>`
    ///
    /// Ids are fresh per booking, so there is nothing to overwrite and no
    /// concurrency check.
    pub async fn put(&self, booking: &Booking) -> Result<()> {
        let value = serde_json::to_string(booking).context("Failed to serialize booking")?;
        self.kv.put(&booking.storage_key(), value).await
    }

    /// Read every stored booking, in no particular order
    ///
    /// Values are fetched concurrently. A record that cannot be fetched, has
    /// vanished since the key listing, or does not deserialize is left out of
    /// the result instead of failing the whole read.
    pub async fn list_all(&self) -> Result<Vec<Booking>> {
        let pages: Vec<Vec<String>> = self.key_pages().try_collect().await?;
        let keys: Vec<String> = pages.into_iter().flatten().collect();

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = join_all(keys.iter().map(|key| self.fetch(key))).await;
        let bookings: Vec<Booking> = fetched.into_iter().flatten().collect();

        tracing::debug!("Read {} of {} stored bookings", bookings.len(), keys.len());
        Ok(bookings)
    }

    /// Lazy sequence of booking key pages, ending when the backend stops returning a cursor
    fn key_pages(&self) -> impl Stream<Item = Result<Vec<String>>> + use<> {
        let kv = Arc::clone(&self.kv);

        // `None` once the last page has been read; `Some(cursor)` while more remain.
        stream::try_unfold(Some(None::<String>), move |state| {
            let kv = Arc::clone(&kv);
            async move {
                let Some(cursor) = state else {
                    return Ok::<_, anyhow::Error>(None);
                };
                let page = kv
                    .list(BOOKING_KEY_PREFIX, cursor.as_deref())
                    .await
                    .context("Failed to list booking keys")?;
                Ok(Some((page.keys, page.cursor.map(Some))))
            }
        })
    }

    async fn fetch(&self, key: &str) -> Option<Booking> {
        match self.kv.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(booking) => Some(booking),
                Err(e) => {
                    tracing::warn!("Skipping unreadable booking {}: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                tracing::debug!("Booking {} listed but not readable yet", key);
                None
            }
            Err(e) => {
                tracing::warn!("Skipping booking {} after fetch failure: {:#}", key, e);
                None
            }
        }
    }
}
