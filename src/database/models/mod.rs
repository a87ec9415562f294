// 数据库实体定义

pub mod blog;
pub mod shop;
pub mod user;

pub use blog::{BlogEntity, NewBlog};
pub use shop::{ShopEntity, ShopUpdate};
pub use user::UserEntity;
