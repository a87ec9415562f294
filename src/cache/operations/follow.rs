use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::keys::follows_key;
use crate::cache::store::KvStore;
use crate::database::FollowRepository;
use crate::error::{AppError, AppResult};

/// 关注关系缓存
///
/// `follows:{userId}` 集合镜像关系表 tb_follow，关系库写成功后才写集合。
pub struct FollowSetCache {
    store: Arc<dyn KvStore>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowSetCache {
    pub fn new(store: Arc<dyn KvStore>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { store, follows }
    }

    /// 关注或取关
    pub async fn follow(&self, user_id: i64, target_id: i64, is_follow: bool) -> AppResult<()> {
        if user_id == target_id {
            return Err(AppError::invalid("不能关注自己"));
        }
        let key = follows_key(user_id);
        let member = target_id.to_string();

        // 关系已存在也要写集合，集合命令幂等
        if is_follow {
            let inserted = self.follows.insert(user_id, target_id).await?;
            self.store.sadd(&key, &member).await?;
            tracing::debug!("User {} followed {} (new: {})", user_id, target_id, inserted);
        } else {
            let deleted = self.follows.delete(user_id, target_id).await?;
            self.store.srem(&key, &member).await?;
            tracing::debug!("User {} unfollowed {} (existed: {})", user_id, target_id, deleted);
        }
        Ok(())
    }

    /// 是否已关注，以关系库为准
    pub async fn is_following(&self, user_id: i64, target_id: i64) -> AppResult<bool> {
        self.follows.exists(user_id, target_id).await
    }

    /// 两个用户共同关注的人，无序
    pub async fn common_connections(&self, viewer_id: i64, subject_id: i64) -> AppResult<HashSet<i64>> {
        let keys = [follows_key(viewer_id), follows_key(subject_id)];
        let members = self.store.sinter(&keys).await?;

        Ok(members
            .iter()
            .filter_map(|member| member.parse::<i64>().ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryStore;
    use crate::database::MemoryDatabase;

    fn finder() -> (FollowSetCache, Arc<MemoryDatabase>) {
        let (finder, db, _) = finder_with_store();
        (finder, db)
    }

    fn finder_with_store() -> (FollowSetCache, Arc<MemoryDatabase>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let db = Arc::new(MemoryDatabase::new());
        (FollowSetCache::new(store.clone(), db.clone()), db, store)
    }

    #[tokio::test]
    async fn common_connections_is_symmetric() {
        let (finder, _) = finder();
        for target in [10, 11, 12] {
            finder.follow(1, target, true).await.unwrap();
        }
        for target in [11, 12, 13] {
            finder.follow(2, target, true).await.unwrap();
        }

        let ab = finder.common_connections(1, 2).await.unwrap();
        let ba = finder.common_connections(2, 1).await.unwrap();
        assert_eq!(ab, HashSet::from([11, 12]));
        assert_eq!(ab, ba);
    }

    #[tokio::test]
    async fn following_nobody_yields_empty_set() {
        let (finder, _) = finder();
        finder.follow(1, 10, true).await.unwrap();

        assert!(finder.common_connections(1, 2).await.unwrap().is_empty());
        assert!(finder.common_connections(3, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unfollow_removes_from_set_and_table() {
        let (finder, db) = finder();
        finder.follow(1, 10, true).await.unwrap();
        finder.follow(2, 10, true).await.unwrap();
        assert!(finder.is_following(1, 10).await.unwrap());

        finder.follow(1, 10, false).await.unwrap();
        assert!(!finder.is_following(1, 10).await.unwrap());
        assert!(!FollowRepository::exists(db.as_ref(), 1, 10).await.unwrap());
        assert!(finder.common_connections(1, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn following_self_is_rejected() {
        let (finder, _) = finder();
        let err = finder.follow(5, 5, true).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn retry_after_set_write_failure_repairs_mirror() {
        let (finder, db, store) = finder_with_store();
        finder.follow(2, 10, true).await.unwrap();

        // 关系表写入成功，集合写入失败
        store.set_unavailable(true);
        assert!(finder.follow(1, 10, true).await.is_err());
        assert!(FollowRepository::exists(db.as_ref(), 1, 10).await.unwrap());
        store.set_unavailable(false);
        assert!(finder.common_connections(1, 2).await.unwrap().is_empty());

        finder.follow(1, 10, true).await.unwrap();
        assert_eq!(
            finder.common_connections(1, 2).await.unwrap(),
            HashSet::from([10])
        );
    }

    #[tokio::test]
    async fn retry_after_failed_unfollow_clears_mirror() {
        let (finder, db, store) = finder_with_store();
        finder.follow(1, 10, true).await.unwrap();
        finder.follow(2, 10, true).await.unwrap();

        store.set_unavailable(true);
        assert!(finder.follow(1, 10, false).await.is_err());
        store.set_unavailable(false);
        assert!(!FollowRepository::exists(db.as_ref(), 1, 10).await.unwrap());

        finder.follow(1, 10, false).await.unwrap();
        assert!(finder.common_connections(1, 2).await.unwrap().is_empty());
    }
}
