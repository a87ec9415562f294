//! 关注流：推模式写扩散 + 基于分数的滚动分页
//!
//! 发布笔记时把笔记id写进每个粉丝的收件箱 `feed:{userId}`，分数是发布时间（毫秒）。
//! 读取时按分数倒序翻页。分数可能重复（同一毫秒发布），所以游标同时记录
//! 上一页的最小分数和该分数下已经返回的条数，下一页从这个位置继续。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::keys::feed_key;
use crate::cache::store::KvStore;
use crate::database::FollowRepository;
use crate::error::AppResult;

/// 滚动分页游标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCursor {
    /// 分数上界（含），`None` 表示不设上界，即第一页
    pub max_time: Option<i64>,
    /// 分数等于 `max_time` 的条目中需要跳过的个数
    pub offset: usize,
}

impl FeedCursor {
    pub fn first() -> Self {
        Self {
            max_time: None,
            offset: 0,
        }
    }
}

impl Default for FeedCursor {
    fn default() -> Self {
        Self::first()
    }
}

/// 一页收件箱内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    /// 笔记id，发布时间倒序
    pub ids: Vec<i64>,
    /// 下一页游标，`None` 表示没有更多数据
    pub next: Option<FeedCursor>,
}

pub struct FeedEngine {
    store: Arc<dyn KvStore>,
    follows: Arc<dyn FollowRepository>,
}

impl FeedEngine {
    pub fn new(store: Arc<dyn KvStore>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { store, follows }
    }

    /// 推送到作者所有粉丝的收件箱，粉丝列表以关系库为准
    ///
    /// 返回推送的粉丝数。
    pub async fn publish(&self, author_id: i64, blog_id: i64, time: i64) -> AppResult<usize> {
        let followers = self.follows.follower_ids(author_id).await?;
        let member = blog_id.to_string();

        for follower_id in &followers {
            self.store
                .zadd(&feed_key(*follower_id), &member, time as f64)
                .await?;
        }

        tracing::info!(
            "Pushed blog {} of user {} to {} followers",
            blog_id,
            author_id,
            followers.len()
        );
        Ok(followers.len())
    }

    /// 从游标位置读取一页
    pub async fn scroll(
        &self,
        subscriber_id: i64,
        cursor: FeedCursor,
        page_size: usize,
    ) -> AppResult<FeedPage> {
        let max = cursor.max_time.map(|t| t as f64).unwrap_or(f64::INFINITY);
        let entries = self
            .store
            .zrevrange_by_score(&feed_key(subscriber_id), max, 0.0, cursor.offset, page_size)
            .await?;

        let mut ids = Vec::with_capacity(entries.len());
        let mut min_time: Option<i64> = None;
        let mut ties = 0usize;
        for (member, score) in &entries {
            match member.parse::<i64>() {
                Ok(id) => ids.push(id),
                Err(_) => tracing::warn!("收件箱中存在非法笔记id: {}", member),
            }
            // 非法成员同样占用了一个位置，要计入偏移
            let time = *score as i64;
            if min_time == Some(time) {
                ties += 1;
            } else {
                min_time = Some(time);
                ties = 1;
            }
        }

        let next = match min_time {
            Some(min_time) if entries.len() >= page_size => {
                // 整页都停留在上一页的最小分数上时，之前跳过的条目也要累计进去
                let offset = if cursor.max_time == Some(min_time) {
                    cursor.offset + ties
                } else {
                    ties
                };
                Some(FeedCursor {
                    max_time: Some(min_time),
                    offset,
                })
            }
            _ => None,
        };

        Ok(FeedPage { ids, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryStore;
    use crate::database::MemoryDatabase;

    fn engine() -> (FeedEngine, Arc<MemoryDatabase>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let db = Arc::new(MemoryDatabase::new());
        (FeedEngine::new(store.clone(), db.clone()), db, store)
    }

    /// 从第一页读到底，把所有页拼起来
    async fn drain(engine: &FeedEngine, subscriber: i64, page_size: usize) -> Vec<i64> {
        let mut all = Vec::new();
        let mut cursor = FeedCursor::first();
        for _ in 0..100 {
            let page = engine.scroll(subscriber, cursor, page_size).await.unwrap();
            all.extend(page.ids);
            match page.next {
                Some(next) => cursor = next,
                None => return all,
            }
        }
        panic!("pagination did not terminate");
    }

    async fn seed(store: &MemoryStore, subscriber: i64, items: &[(i64, i64)]) {
        for (id, time) in items {
            store
                .zadd(&feed_key(subscriber), &id.to_string(), *time as f64)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_follower() {
        let (engine, db, _) = engine();
        for follower in [2, 3, 4] {
            db.add_follow(follower, 1).await;
        }
        db.add_follow(5, 99).await;

        let pushed = engine.publish(1, 100, 1_700_000_000_000).await.unwrap();
        assert_eq!(pushed, 3);

        for follower in [2, 3, 4] {
            let page = engine
                .scroll(follower, FeedCursor::first(), 10)
                .await
                .unwrap();
            assert_eq!(page.ids, vec![100]);
            assert_eq!(page.next, None);
        }
        let other = engine.scroll(5, FeedCursor::first(), 10).await.unwrap();
        assert!(other.ids.is_empty());
    }

    #[tokio::test]
    async fn empty_feed_is_an_empty_page_without_cursor() {
        let (engine, _, _) = engine();
        let page = engine.scroll(1, FeedCursor::first(), 10).await.unwrap();
        assert_eq!(
            page,
            FeedPage {
                ids: Vec::new(),
                next: None
            }
        );
    }

    #[tokio::test]
    async fn cursor_tracks_ties_at_page_boundary() {
        let (engine, _, store) = engine();
        seed(&store, 1, &[(1, 100), (2, 200), (3, 200), (4, 300)]).await;

        let first = engine.scroll(1, FeedCursor::first(), 3).await.unwrap();
        assert_eq!(first.ids, vec![4, 3, 2]);
        assert_eq!(
            first.next,
            Some(FeedCursor {
                max_time: Some(200),
                offset: 2
            })
        );

        let second = engine.scroll(1, first.next.unwrap(), 3).await.unwrap();
        assert_eq!(second.ids, vec![1]);
        assert_eq!(second.next, None);
    }

    #[tokio::test]
    async fn five_identical_timestamps_with_page_size_two() {
        let (engine, _, store) = engine();
        let t = 1_700_000_000_000;
        seed(&store, 1, &[(11, t), (12, t), (13, t), (14, t), (15, t)]).await;

        let mut cursor = FeedCursor::first();
        let mut offsets = Vec::new();
        let mut seen = Vec::new();
        loop {
            let page = engine.scroll(1, cursor, 2).await.unwrap();
            seen.extend(page.ids);
            match page.next {
                Some(next) => {
                    offsets.push(next.offset);
                    cursor = next;
                }
                None => break,
            }
        }

        assert_eq!(offsets, vec![2, 4]);
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![11, 12, 13, 14, 15]);
        assert_eq!(seen.len(), 5);
    }

    #[tokio::test]
    async fn colliding_clusters_are_gap_free_and_duplicate_free() {
        let (engine, _, store) = engine();
        // 三组同分数的条目，夹杂单独的条目
        let mut items = Vec::new();
        let mut id = 0;
        for (time, count) in [(900, 4), (800, 1), (700, 5), (600, 1), (500, 3)] {
            for _ in 0..count {
                id += 1;
                items.push((id, time));
            }
        }
        seed(&store, 7, &items).await;

        for page_size in 1..=6 {
            let ids = drain(&engine, 7, page_size).await;
            assert_eq!(ids.len(), items.len(), "page_size={}", page_size);

            let mut unique = ids.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), items.len(), "page_size={}", page_size);

            let times: Vec<i64> = ids
                .iter()
                .map(|id| items.iter().find(|(i, _)| i == id).unwrap().1)
                .collect();
            assert!(
                times.windows(2).all(|w| w[0] >= w[1]),
                "page_size={} not in descending time order",
                page_size
            );
        }
    }

    #[tokio::test]
    async fn full_last_page_is_followed_by_empty_page() {
        let (engine, _, store) = engine();
        seed(&store, 1, &[(1, 10), (2, 20)]).await;

        let first = engine.scroll(1, FeedCursor::first(), 2).await.unwrap();
        assert_eq!(first.ids, vec![2, 1]);
        let next = first.next.expect("full page carries a cursor");

        let second = engine.scroll(1, next, 2).await.unwrap();
        assert!(second.ids.is_empty());
        assert_eq!(second.next, None);
    }
}
