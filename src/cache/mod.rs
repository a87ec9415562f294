// 缓存模块
// 包含键值存储抽象、缓存键和基于缓存的业务组件

pub mod keys;
pub mod memory;
pub mod models;
pub mod operations;
pub mod store;

// 重新导出常用类型，方便其他模块使用
pub use memory::MemoryStore;
pub use operations::{
    AttendanceCounter, CacheableEntity, EntityCache, FeedCursor, FeedEngine, FeedPage,
    FollowSetCache, LikeLedger, LoginCodes,
};
pub use store::{KvStore, RedisStore};
