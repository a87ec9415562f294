use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 用户实体，对应 tb_user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub phone: String,
    pub nick_name: String,
    pub icon: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}
