use serde::Deserialize;

use crate::{
    AppState,
    database::models::{ShopEntity, ShopUpdate},
    error::{AppError, AppResult},
};

/// 按类型查询每页条数
pub const SHOP_PAGE_SIZE: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct ShopTypeQuery {
    pub type_id: i64,
    pub current: Option<u32>,
}

/// 按类型分页查询，不走缓存
pub async fn shops_of_type(
    state: &AppState,
    type_id: i64,
    page: u32,
) -> AppResult<Vec<ShopEntity>> {
    state
        .shops
        .find_by_type(type_id, page.max(1), SHOP_PAGE_SIZE)
        .await
}

/// 按id查询店铺，走旁路缓存
pub async fn find_shop(state: &AppState, id: i64) -> AppResult<ShopEntity> {
    let shops = state.shops.clone();
    state
        .shop_cache()
        .get(id, || async move { shops.find_by_id(id).await })
        .await
}

/// 先写数据库再删缓存，返回更新后的店铺id
pub async fn update_shop(state: &AppState, update: &ShopUpdate) -> AppResult<i64> {
    let id = update
        .id
        .ok_or_else(|| AppError::invalid("店铺id不能为空"))?;

    if !state.shops.update(id, update).await? {
        return Err(AppError::not_found(format!("店铺 {} 不存在", id)));
    }
    state.shop_cache().invalidate(id).await;

    tracing::info!("Updated shop {}", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::{
        cache::{MemoryStore, keys::shop_cache_key},
        config::Config,
        database::MemoryDatabase,
    };

    fn shop(id: i64, name: &str) -> ShopEntity {
        shop_of_type(id, name, 1)
    }

    fn shop_of_type(id: i64, name: &str, type_id: i64) -> ShopEntity {
        let now = Utc::now();
        ShopEntity {
            id,
            name: name.to_string(),
            type_id,
            images: String::new(),
            area: Some("大关".into()),
            address: "金华路锦昌文华苑29号".into(),
            x: 120.149192,
            y: 30.316078,
            avg_price: Some(80),
            sold: 4215,
            comments: 3035,
            score: 37,
            open_hours: Some("10:00-22:00".into()),
            create_time: now,
            update_time: now,
        }
    }

    async fn state() -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let db = Arc::new(MemoryDatabase::new());
        db.add_shop(shop(1, "103茶餐厅")).await;
        (AppState::in_memory(Config::default(), store.clone(), db), store)
    }

    #[tokio::test]
    async fn update_invalidates_cached_snapshot() {
        let (state, store) = state().await;

        assert_eq!(find_shop(&state, 1).await.unwrap().name, "103茶餐厅");
        assert!(store.contains_key(&shop_cache_key(1)).await);

        let update = ShopUpdate {
            id: Some(1),
            name: Some("蔡馬洪涛烤肉".into()),
            ..ShopUpdate::default()
        };
        update_shop(&state, &update).await.unwrap();
        assert!(!store.contains_key(&shop_cache_key(1)).await);
        assert_eq!(find_shop(&state, 1).await.unwrap().name, "蔡馬洪涛烤肉");
    }

    #[tokio::test]
    async fn update_rejects_missing_id_and_unknown_shop() {
        let (state, _) = state().await;

        let err = update_shop(&state, &ShopUpdate::default()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let unknown = ShopUpdate {
            id: Some(42),
            ..ShopUpdate::default()
        };
        let err = update_shop(&state, &unknown).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_shop_is_not_found() {
        let (state, store) = state().await;
        let err = find_shop(&state, 9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!store.contains_key(&shop_cache_key(9)).await);
    }

    #[tokio::test]
    async fn shops_of_type_pages_by_id() {
        let (state, _) = state().await;
        let db = MemoryDatabase::new();
        for id in 2..=14 {
            let type_id = if id % 2 == 0 { 1 } else { 2 };
            db.add_shop(shop_of_type(id, "shop", type_id)).await;
        }
        let state = AppState {
            shops: Arc::new(db),
            ..state
        };

        let first: Vec<i64> = shops_of_type(&state, 1, 1)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(first, vec![2, 4, 6, 8, 10]);

        let odd: Vec<i64> = shops_of_type(&state, 2, 0)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(odd, vec![3, 5, 7, 9, 11]);

        let second: Vec<i64> = shops_of_type(&state, 1, 2)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(second, vec![12, 14]);
        assert!(shops_of_type(&state, 1, 3).await.unwrap().is_empty());
        assert!(shops_of_type(&state, 9, 1).await.unwrap().is_empty());
    }
}
