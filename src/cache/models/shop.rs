use crate::cache::keys::shop_keys::SHOP_KIND;
use crate::cache::operations::CacheableEntity;
use crate::database::models::ShopEntity;

/// 店铺以 JSON 快照缓存
impl CacheableEntity for ShopEntity {
    const KIND: &'static str = SHOP_KIND;
}
