use std::sync::Arc;

use crate::cache::keys::blog_like_key;
use crate::cache::store::KvStore;
use crate::database::BlogRepository;
use crate::error::{AppError, AppResult};
use crate::utils::now_millis;

/// 笔记点赞记录
///
/// 每篇笔记一个有序集合 `like:{blogId}`，成员是用户id，分数是点赞时间（毫秒）。
/// 点赞数保存在关系库 `tb_blog.liked`。两者分两次写入，中途失败会不一致，
/// 这里不做补偿。
pub struct LikeLedger {
    store: Arc<dyn KvStore>,
    blogs: Arc<dyn BlogRepository>,
}

impl LikeLedger {
    pub fn new(store: Arc<dyn KvStore>, blogs: Arc<dyn BlogRepository>) -> Self {
        Self { store, blogs }
    }

    pub async fn is_liked(&self, blog_id: i64, user_id: i64) -> AppResult<bool> {
        let score = self
            .store
            .zscore(&blog_like_key(blog_id), &user_id.to_string())
            .await?;
        Ok(score.is_some())
    }

    /// 点赞或取消点赞，返回操作后的状态
    pub async fn toggle(&self, blog_id: i64, user_id: i64) -> AppResult<bool> {
        self.toggle_at(blog_id, user_id, now_millis()).await
    }

    pub async fn toggle_at(&self, blog_id: i64, user_id: i64, liked_at: i64) -> AppResult<bool> {
        let key = blog_like_key(blog_id);
        let member = user_id.to_string();

        if !self.is_liked(blog_id, user_id).await? {
            // 点赞数 +1，成功后再写入集合
            if !self.blogs.adjust_liked(blog_id, 1).await? {
                return Err(AppError::not_found(format!("笔记 {} 不存在", blog_id)));
            }
            if let Err(e) = self.store.zadd(&key, &member, liked_at as f64).await {
                tracing::error!(
                    "点赞数已增加但写入点赞集合失败 blog={} user={}: {}",
                    blog_id,
                    user_id,
                    e
                );
                return Err(e.into());
            }
            tracing::debug!("User {} liked blog {}", user_id, blog_id);
            Ok(true)
        } else {
            if !self.blogs.adjust_liked(blog_id, -1).await? {
                return Err(AppError::not_found(format!("笔记 {} 不存在", blog_id)));
            }
            if let Err(e) = self.store.zrem(&key, &member).await {
                tracing::error!(
                    "点赞数已减少但移出点赞集合失败 blog={} user={}: {}",
                    blog_id,
                    user_id,
                    e
                );
                return Err(e.into());
            }
            tracing::debug!("User {} unliked blog {}", user_id, blog_id);
            Ok(false)
        }
    }

    /// 最早点赞的 `n` 个用户，按点赞时间升序
    ///
    /// 同一毫秒内的点赞分数相同，按用户id的字符串字典序排列。
    pub async fn top_likers(&self, blog_id: i64, n: usize) -> AppResult<Vec<i64>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let members = self
            .store
            .zrange(&blog_like_key(blog_id), 0, n as isize - 1)
            .await?;

        Ok(members
            .iter()
            .filter_map(|member| match member.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!("点赞集合中存在非法用户id: {}", member);
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryStore;
    use crate::database::MemoryDatabase;
    use crate::database::models::NewBlog;

    async fn setup() -> (LikeLedger, Arc<MemoryDatabase>, Arc<MemoryStore>, i64) {
        let store = Arc::new(MemoryStore::new());
        let db = Arc::new(MemoryDatabase::new());
        let blog = BlogRepository::insert(
            db.as_ref(),
            1,
            &NewBlog {
                shop_id: 1,
                title: "t".into(),
                images: String::new(),
                content: "c".into(),
            },
        )
        .await
        .unwrap();
        (LikeLedger::new(store.clone(), db.clone()), db, store, blog.id)
    }

    async fn liked_count(db: &MemoryDatabase, blog_id: i64) -> i32 {
        BlogRepository::find_by_id(db, blog_id)
            .await
            .unwrap()
            .unwrap()
            .liked
    }

    #[tokio::test]
    async fn toggle_twice_restores_state_and_counter() {
        let (ledger, db, _, blog_id) = setup().await;

        assert!(ledger.toggle(blog_id, 10).await.unwrap());
        assert!(ledger.is_liked(blog_id, 10).await.unwrap());
        assert_eq!(liked_count(&db, blog_id).await, 1);

        assert!(!ledger.toggle(blog_id, 10).await.unwrap());
        assert!(!ledger.is_liked(blog_id, 10).await.unwrap());
        assert_eq!(liked_count(&db, blog_id).await, 0);
    }

    #[tokio::test]
    async fn top_likers_keeps_first_liked_first() {
        let (ledger, _, _, blog_id) = setup().await;

        // 用户id的字典序与点赞顺序相反
        ledger.toggle_at(blog_id, 9, 1_000).await.unwrap();
        ledger.toggle_at(blog_id, 30, 2_000).await.unwrap();
        ledger.toggle_at(blog_id, 200, 3_000).await.unwrap();

        assert_eq!(ledger.top_likers(blog_id, 5).await.unwrap(), vec![9, 30, 200]);
        assert_eq!(ledger.top_likers(blog_id, 2).await.unwrap(), vec![9, 30]);
        assert!(ledger.top_likers(blog_id, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn same_millisecond_likes_fall_back_to_member_order() {
        let (ledger, _, _, blog_id) = setup().await;

        for user in [30, 200, 9] {
            ledger.toggle_at(blog_id, user, 1_000).await.unwrap();
        }
        ledger.toggle_at(blog_id, 5, 999).await.unwrap();

        // "200" < "30" < "9"
        assert_eq!(
            ledger.top_likers(blog_id, 5).await.unwrap(),
            vec![5, 200, 30, 9]
        );
    }

    #[tokio::test]
    async fn relike_moves_user_to_the_end() {
        let (ledger, _, _, blog_id) = setup().await;

        ledger.toggle_at(blog_id, 1, 100).await.unwrap();
        ledger.toggle_at(blog_id, 2, 200).await.unwrap();
        ledger.toggle_at(blog_id, 1, 300).await.unwrap();
        ledger.toggle_at(blog_id, 1, 400).await.unwrap();

        assert_eq!(ledger.top_likers(blog_id, 5).await.unwrap(), vec![2, 1]);
    }

    #[tokio::test]
    async fn unknown_blog_is_not_found_and_set_untouched() {
        let (ledger, _, store, _) = setup().await;

        let err = ledger.toggle(999, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!store.contains_key("like:999").await);
    }

    #[tokio::test]
    async fn store_outage_fails_before_touching_counter() {
        let (ledger, db, store, blog_id) = setup().await;

        store.set_unavailable(true);
        assert!(ledger.toggle(blog_id, 5).await.is_err());
        store.set_unavailable(false);

        // 成员检查就已失败，计数器未被修改
        assert_eq!(liked_count(&db, blog_id).await, 0);
        assert!(!ledger.is_liked(blog_id, 5).await.unwrap());
    }
}
