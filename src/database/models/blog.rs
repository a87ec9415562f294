use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 探店笔记实体，对应 tb_blog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BlogEntity {
    pub id: i64,
    pub shop_id: i64,
    /// 作者
    pub user_id: i64,
    pub title: String,
    pub images: String,
    pub content: String,
    /// 点赞数量
    pub liked: i32,
    pub comments: i32,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// 新笔记
#[derive(Debug, Clone, Deserialize)]
pub struct NewBlog {
    pub shop_id: i64,
    pub title: String,
    #[serde(default)]
    pub images: String,
    pub content: String,
}
