use std::sync::Arc;

use cache::{
    AttendanceCounter, EntityCache, FeedEngine, FollowSetCache, KvStore, LikeLedger, LoginCodes,
    RedisStore,
};
use config::Config;
use database::{
    BlogRepository, FollowRepository, MemoryDatabase, ShopRepository, UserRepository,
    models::ShopEntity,
    repositories::{PgBlogRepository, PgFollowRepository, PgShopRepository, PgUserRepository},
};
use redis::Client as RedisClient;
use sqlx::PgPool;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

/// 应用状态，键值存储和关系库都以接口注入
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub redis: Arc<dyn KvStore>,
    pub shops: Arc<dyn ShopRepository>,
    pub blogs: Arc<dyn BlogRepository>,
    pub users: Arc<dyn UserRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, redis: Arc<RedisClient>) -> Self {
        Self {
            config,
            redis: Arc::new(RedisStore::new(redis)),
            shops: Arc::new(PgShopRepository::new(pool.clone())),
            blogs: Arc::new(PgBlogRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            follows: Arc::new(PgFollowRepository::new(pool)),
        }
    }

    /// 全部使用内存实现
    pub fn in_memory(config: Config, redis: Arc<dyn KvStore>, db: Arc<MemoryDatabase>) -> Self {
        Self {
            config,
            redis,
            shops: db.clone(),
            blogs: db.clone(),
            users: db.clone(),
            follows: db,
        }
    }

    pub fn shop_cache(&self) -> EntityCache<ShopEntity> {
        EntityCache::new(self.redis.clone(), self.config.shop_cache_ttl())
    }

    pub fn like_ledger(&self) -> LikeLedger {
        LikeLedger::new(self.redis.clone(), self.blogs.clone())
    }

    pub fn feed_engine(&self) -> FeedEngine {
        FeedEngine::new(self.redis.clone(), self.follows.clone())
    }

    pub fn follow_sets(&self) -> FollowSetCache {
        FollowSetCache::new(self.redis.clone(), self.follows.clone())
    }

    pub fn attendance(&self) -> AttendanceCounter {
        AttendanceCounter::new(self.redis.clone())
    }

    pub fn login_codes(&self) -> LoginCodes {
        LoginCodes::new(self.redis.clone())
    }
}
