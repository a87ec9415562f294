/// 缓存键模块
/// 提供各种缓存键生成函数

// 店铺缓存键
pub mod shop_keys;

// 探店笔记缓存键
pub mod blog_keys;

// 用户缓存键
pub mod user_keys;

pub use blog_keys::{blog_like_key, feed_key};
pub use shop_keys::{entity_cache_key, shop_cache_key};
pub use user_keys::{follows_key, login_code_key, sign_key};
