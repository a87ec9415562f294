/// 实体缓存的命名空间
const CACHE_NAMESPACE: &str = "cache";

/// 店铺实体类型
pub const SHOP_KIND: &str = "shop";

/// 生成实体缓存键 `{namespace}:{kind}:{id}`
pub fn entity_cache_key(kind: &str, id: i64) -> String {
    format!("{}:{}:{}", CACHE_NAMESPACE, kind, id)
}

/// 生成店铺缓存键
pub fn shop_cache_key(shop_id: i64) -> String {
    entity_cache_key(SHOP_KIND, shop_id)
}
