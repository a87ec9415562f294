use async_trait::async_trait;
use sqlx::PgPool;

use super::BlogRepository;
use crate::database::models::{BlogEntity, NewBlog};
use crate::error::AppResult;

const BLOG_COLUMNS: &str =
    "id, shop_id, user_id, title, images, content, liked, comments, create_time, update_time";

/// 探店笔记存储库实现
#[derive(Clone)]
pub struct PgBlogRepository {
    pool: PgPool,
}

impl PgBlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogRepository for PgBlogRepository {
    async fn insert(&self, author_id: i64, blog: &NewBlog) -> AppResult<BlogEntity> {
        let sql = format!(
            r#"
            INSERT INTO tb_blog (shop_id, user_id, title, images, content, liked, comments)
            VALUES ($1, $2, $3, $4, $5, 0, 0)
            RETURNING {BLOG_COLUMNS}
            "#
        );
        let blog = sqlx::query_as::<_, BlogEntity>(&sql)
            .bind(blog.shop_id)
            .bind(author_id)
            .bind(&blog.title)
            .bind(&blog.images)
            .bind(&blog.content)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Created blog {} by user {}", blog.id, author_id);
        Ok(blog)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<BlogEntity>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM tb_blog WHERE id = $1");
        let blog = sqlx::query_as::<_, BlogEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(blog)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<BlogEntity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        // IN 查询不保证顺序，按传入数组的位置排序
        let sql = format!(
            "SELECT {BLOG_COLUMNS} FROM tb_blog WHERE id = ANY($1) ORDER BY array_position($1::int8[], id)"
        );
        let blogs = sqlx::query_as::<_, BlogEntity>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(blogs)
    }

    async fn find_hot(&self, page: u32, page_size: u32) -> AppResult<Vec<BlogEntity>> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let sql = format!(
            "SELECT {BLOG_COLUMNS} FROM tb_blog ORDER BY liked DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let blogs = sqlx::query_as::<_, BlogEntity>(&sql)
            .bind(i64::from(page_size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(blogs)
    }

    async fn adjust_liked(&self, id: i64, delta: i32) -> AppResult<bool> {
        let result = sqlx::query("UPDATE tb_blog SET liked = liked + $2 WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
