use async_trait::async_trait;
use sqlx::PgPool;

use super::UserRepository;
use crate::database::models::UserEntity;
use crate::error::AppResult;

/// 用户存储库实现
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserEntity>> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, phone, nick_name, icon, create_time, update_time
            FROM tb_user
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<UserEntity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, phone, nick_name, icon, create_time, update_time
            FROM tb_user
            WHERE id = ANY($1)
            ORDER BY array_position($1::int8[], id)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<UserEntity>> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, phone, nick_name, icon, create_time, update_time
            FROM tb_user
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, phone: &str, nick_name: &str) -> AppResult<UserEntity> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO tb_user (phone, nick_name)
            VALUES ($1, $2)
            RETURNING id, phone, nick_name, icon, create_time, update_time
            "#,
        )
        .bind(phone)
        .bind(nick_name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Registered user {} with phone {}", user.id, phone);
        Ok(user)
    }
}
