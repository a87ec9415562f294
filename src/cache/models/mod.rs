/// 缓存数据模型
/// 声明哪些实体可以进入实体缓存

// 店铺
pub mod shop;
