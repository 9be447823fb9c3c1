use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{KeyPage, KvStore};

/// In-process key-value store
///
/// Keys are kept ordered so listing behaves like a real paginated backend:
/// each page holds at most `page_size` keys and the cursor is the last key
/// returned.
#[derive(Clone)]
pub struct MemoryKv {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    page_size: usize,
}

impl MemoryKv {
    pub fn new(page_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn list(&self, prefix: &str, cursor: Option<&str>) -> Result<KeyPage> {
        let entries = self.entries.read().await;

        let lower = match cursor {
            Some(cursor) => Bound::Excluded(cursor.to_string()),
            None => Bound::Included(prefix.to_string()),
        };

        // Fetch one extra key to learn whether another page exists.
        let mut keys: Vec<String> = entries
            .range((lower, Bound::Unbounded))
            .map(|(key, _)| key)
            .skip_while(|key| !key.starts_with(prefix))
            .take_while(|key| key.starts_with(prefix))
            .take(self.page_size + 1)
            .cloned()
            .collect();

        let cursor = if keys.len() > self.page_size {
            keys.truncate(self.page_size);
            keys.last().cloned()
        } else {
            None
        };

        Ok(KeyPage { keys, cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let kv = MemoryKv::new(10);
        kv.put("booking:1", "{}".to_string()).await.unwrap();

        assert_eq!(kv.get("booking:1").await.unwrap(), Some("{}".to_string()));
        assert_eq!(kv.get("booking:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_scopes_to_prefix() {
        let kv = MemoryKv::new(10);
        kv.put("audit:1", "x".to_string()).await.unwrap();
        kv.put("booking:a", "x".to_string()).await.unwrap();
        kv.put("booking:b", "x".to_string()).await.unwrap();
        kv.put("bookingz", "x".to_string()).await.unwrap();

        let page = kv.list("booking:", None).await.unwrap();

        assert_eq!(page.keys, vec!["booking:a", "booking:b"]);
        assert_eq!(page.cursor, None);
    }

    #[tokio::test]
    async fn test_list_paginates_with_cursor() {
        let kv = MemoryKv::new(2);
        for id in ["a", "b", "c", "d", "e"] {
            kv.put(&format!("booking:{}", id), "x".to_string()).await.unwrap();
        }

        let first = kv.list("booking:", None).await.unwrap();
        assert_eq!(first.keys, vec!["booking:a", "booking:b"]);
        assert_eq!(first.cursor.as_deref(), Some("booking:b"));

        let second = kv.list("booking:", first.cursor.as_deref()).await.unwrap();
        assert_eq!(second.keys, vec!["booking:c", "booking:d"]);
        assert_eq!(second.cursor.as_deref(), Some("booking:d"));

        let third = kv.list("booking:", second.cursor.as_deref()).await.unwrap();
        assert_eq!(third.keys, vec!["booking:e"]);
        assert_eq!(third.cursor, None);
    }

    #[tokio::test]
    async fn test_exact_page_has_no_trailing_cursor() {
        let kv = MemoryKv::new(2);
        kv.put("booking:a", "x".to_string()).await.unwrap();
        kv.put("booking:b", "x".to_string()).await.unwrap();

        let page = kv.list("booking:", None).await.unwrap();

        assert_eq!(page.keys.len(), 2);
        assert_eq!(page.cursor, None);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let kv = MemoryKv::new(10);
        assert_eq!(kv.list("booking:", None).await.unwrap(), KeyPage::default());
    }
}
