/// 关系库存储接口
///
/// 关系库是权威数据源，缓存层只在这之上做加速。
/// `find_by_ids` 系列不承诺返回顺序，调用方需要按 id 列表自行重排。
use async_trait::async_trait;

use crate::database::models::{BlogEntity, NewBlog, ShopEntity, ShopUpdate, UserEntity};
use crate::error::AppResult;

pub mod blog;
pub mod follow;
pub mod shop;
pub mod user;

pub use blog::PgBlogRepository;
pub use follow::PgFollowRepository;
pub use shop::PgShopRepository;
pub use user::PgUserRepository;

#[async_trait]
pub trait ShopRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ShopEntity>>;

    /// 按类型分页，id 升序，`page` 从 1 开始
    async fn find_by_type(&self, type_id: i64, page: u32, page_size: u32) -> AppResult<Vec<ShopEntity>>;

    /// 按 id 更新非空字段，返回是否命中
    async fn update(&self, id: i64, update: &ShopUpdate) -> AppResult<bool>;
}

#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn insert(&self, author_id: i64, blog: &NewBlog) -> AppResult<BlogEntity>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<BlogEntity>>;

    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<BlogEntity>>;

    /// 按点赞数倒序分页，`page` 从 1 开始
    async fn find_hot(&self, page: u32, page_size: u32) -> AppResult<Vec<BlogEntity>>;

    /// `liked = liked + delta`，返回是否命中
    async fn adjust_liked(&self, id: i64, delta: i32) -> AppResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserEntity>>;

    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<UserEntity>>;

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<UserEntity>>;

    /// 用手机号注册新用户
    async fn create(&self, phone: &str, nick_name: &str) -> AppResult<UserEntity>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// 新增关注，已存在时返回 false
    async fn insert(&self, user_id: i64, follow_user_id: i64) -> AppResult<bool>;

    /// 取消关注，不存在时返回 false
    async fn delete(&self, user_id: i64, follow_user_id: i64) -> AppResult<bool>;

    async fn exists(&self, user_id: i64, follow_user_id: i64) -> AppResult<bool>;

    /// 关注了 `follow_user_id` 的所有用户
    async fn follower_ids(&self, follow_user_id: i64) -> AppResult<Vec<i64>>;
}
