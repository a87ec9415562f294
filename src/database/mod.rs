// 数据库模块
// 包含数据库实体定义和存储库操作

pub mod memory; // 内存实现，测试注入用
pub mod models; // 数据库实体定义
pub mod repositories; // 存储库接口与 Postgres 实现

pub use memory::MemoryDatabase;
pub use repositories::{BlogRepository, FollowRepository, ShopRepository, UserRepository};
