/// 缓存操作
/// 基于键值存储的有序集合、集合、位图实现的业务组件

// 实体旁路缓存
pub mod entity;

// 点赞记录
pub mod like;

// 关注集合与共同关注
pub mod follow;

// 关注流
pub mod feed;

// 签到
pub mod sign;

// 登录验证码
pub mod login;

// 重新导出常用操作
pub use entity::{CacheableEntity, EntityCache};
pub use feed::{FeedCursor, FeedEngine, FeedPage};
pub use follow::FollowSetCache;
pub use like::LikeLedger;
pub use login::LoginCodes;
pub use sign::AttendanceCounter;
