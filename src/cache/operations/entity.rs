use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::cache::keys::entity_cache_key;
use crate::cache::store::KvStore;
use crate::error::{AppError, AppResult};

/// 可放入实体缓存的类型
pub trait CacheableEntity: Serialize + DeserializeOwned + Send + Sync {
    /// 缓存键中的实体类型，如 `shop`
    const KIND: &'static str;
}

/// 旁路缓存（cache-aside）
///
/// 读：先查缓存，未命中回源并写回，带 TTL。不缓存空值。
/// 写：权威数据更新成功后同步删除缓存。
/// 缓存服务故障只降级为回源，不会让请求失败。
pub struct EntityCache<T> {
    store: Arc<dyn KvStore>,
    ttl: Duration,
    _entity: PhantomData<fn() -> T>,
}

impl<T: CacheableEntity> EntityCache<T> {
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            _entity: PhantomData,
        }
    }

    pub fn key(id: i64) -> String {
        entity_cache_key(T::KIND, id)
    }

    /// 读缓存，未命中时调用 `load` 回源
    pub async fn get<F, Fut>(&self, id: i64, load: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Option<T>>>,
    {
        let key = Self::key(id);

        match self.store.get(&key).await {
            Ok(Some(json)) => match serde_json::from_str::<T>(&json) {
                Ok(entity) => {
                    tracing::debug!("Get {} from cache: {}", T::KIND, key);
                    return Ok(entity);
                }
                Err(e) => tracing::warn!("缓存数据无法解析，按未命中处理 {}: {}", key, e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("读取缓存失败，回源查询 {}: {}", key, e),
        }

        let entity = load()
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} {} 不存在", T::KIND, id)))?;

        match serde_json::to_string(&entity) {
            Ok(json) => match self.store.set_ex(&key, &json, self.ttl.as_secs()).await {
                Ok(()) => tracing::debug!("Set {} to cache: {}", T::KIND, key),
                Err(e) => tracing::warn!("写入缓存失败 {}: {}", key, e),
            },
            Err(e) => tracing::warn!("序列化 {} 失败: {}", T::KIND, e),
        }

        Ok(entity)
    }

    /// 删除缓存，失败只记录日志
    pub async fn invalidate(&self, id: i64) {
        let key = Self::key(id);
        if let Err(e) = self.store.del(&key).await {
            tracing::error!("删除缓存失败，最多在 TTL 内读到旧数据 {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryStore;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: i64,
        label: String,
    }

    impl CacheableEntity for Widget {
        const KIND: &'static str = "widget";
    }

    fn widget(id: i64, label: &str) -> Widget {
        Widget {
            id,
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn miss_loads_and_populates() {
        let store = Arc::new(MemoryStore::new());
        let cache = EntityCache::<Widget>::new(store.clone(), Duration::from_secs(60));
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let got = cache
                .get(7, || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(widget(7, "a")))
                })
                .await
                .unwrap();
            assert_eq!(got, widget(7, "a"));
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(store.contains_key("cache:widget:7").await);
    }

    #[tokio::test]
    async fn absent_entity_is_not_found_and_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = EntityCache::<Widget>::new(store.clone(), Duration::from_secs(60));
        let loads = AtomicUsize::new(0);

        for _ in 0..2 {
            let err = cache
                .get(404, || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }

        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert!(!store.contains_key("cache:widget:404").await);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let store = Arc::new(MemoryStore::new());
        let cache = EntityCache::<Widget>::new(store, Duration::from_secs(60));

        cache.get(1, || async { Ok(Some(widget(1, "old"))) }).await.unwrap();
        cache.invalidate(1).await;
        let got = cache
            .get(1, || async { Ok(Some(widget(1, "new"))) })
            .await
            .unwrap();
        assert_eq!(got.label, "new");
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_repopulates_with_current_value() {
        let store = Arc::new(MemoryStore::new());
        let cache = EntityCache::<Widget>::new(store, Duration::from_secs(30 * 60));

        cache.get(1, || async { Ok(Some(widget(1, "v1"))) }).await.unwrap();
        // TTL 内仍是旧快照
        let cached = cache
            .get(1, || async { Ok(Some(widget(1, "v2"))) })
            .await
            .unwrap();
        assert_eq!(cached.label, "v1");

        tokio::time::advance(Duration::from_secs(30 * 60 + 1)).await;
        let fresh = cache
            .get(1, || async { Ok(Some(widget(1, "v2"))) })
            .await
            .unwrap();
        assert_eq!(fresh.label, "v2");
    }

    #[tokio::test]
    async fn store_outage_falls_back_to_loader() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let cache = EntityCache::<Widget>::new(store.clone(), Duration::from_secs(60));

        let got = cache
            .get(3, || async { Ok(Some(widget(3, "db"))) })
            .await
            .unwrap();
        assert_eq!(got.label, "db");

        // 删除失败同样不报错
        cache.invalidate(3).await;
    }

    #[tokio::test]
    async fn corrupt_entry_is_treated_as_miss() {
        let store = Arc::new(MemoryStore::new());
        store.set_ex("cache:widget:5", "{not json", 60).await.unwrap();
        let cache = EntityCache::<Widget>::new(store.clone(), Duration::from_secs(60));

        let got = cache
            .get(5, || async { Ok(Some(widget(5, "db"))) })
            .await
            .unwrap();
        assert_eq!(got.label, "db");
        let raw = store.get("cache:widget:5").await.unwrap().unwrap();
        assert!(raw.contains("\"db\""));
    }
}
