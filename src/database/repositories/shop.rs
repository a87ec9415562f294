use async_trait::async_trait;
use sqlx::PgPool;

use super::ShopRepository;
use crate::database::models::{ShopEntity, ShopUpdate};
use crate::error::AppResult;

/// 店铺存储库实现
#[derive(Clone)]
pub struct PgShopRepository {
    pool: PgPool,
}

impl PgShopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopRepository for PgShopRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ShopEntity>> {
        let shop = sqlx::query_as::<_, ShopEntity>(
            r#"
            SELECT id, name, type_id, images, area, address, x, y, avg_price,
                   sold, comments, score, open_hours, create_time, update_time
            FROM tb_shop
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shop)
    }

    async fn find_by_type(
        &self,
        type_id: i64,
        page: u32,
        page_size: u32,
    ) -> AppResult<Vec<ShopEntity>> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let shops = sqlx::query_as::<_, ShopEntity>(
            r#"
            SELECT id, name, type_id, images, area, address, x, y, avg_price,
                   sold, comments, score, open_hours, create_time, update_time
            FROM tb_shop
            WHERE type_id = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(type_id)
        .bind(i64::from(page_size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(shops)
    }

    async fn update(&self, id: i64, update: &ShopUpdate) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tb_shop SET
                name = COALESCE($2, name),
                type_id = COALESCE($3, type_id),
                images = COALESCE($4, images),
                area = COALESCE($5, area),
                address = COALESCE($6, address),
                x = COALESCE($7, x),
                y = COALESCE($8, y),
                avg_price = COALESCE($9, avg_price),
                open_hours = COALESCE($10, open_hours),
                update_time = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.type_id)
        .bind(&update.images)
        .bind(&update.area)
        .bind(&update.address)
        .bind(update.x)
        .bind(update.y)
        .bind(update.avg_price)
        .bind(&update.open_hours)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
