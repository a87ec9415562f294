use async_trait::async_trait;
use sqlx::PgPool;

use super::FollowRepository;
use crate::error::AppResult;

/// 关注关系存储库实现
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn insert(&self, user_id: i64, follow_user_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO tb_follow (user_id, follow_user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, follow_user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(follow_user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: i64, follow_user_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tb_follow WHERE user_id = $1 AND follow_user_id = $2")
            .bind(user_id)
            .bind(follow_user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, user_id: i64, follow_user_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tb_follow WHERE user_id = $1 AND follow_user_id = $2)",
        )
        .bind(user_id)
        .bind(follow_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn follower_ids(&self, follow_user_id: i64) -> AppResult<Vec<i64>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT user_id FROM tb_follow WHERE follow_user_id = $1")
                .bind(follow_user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }
}
