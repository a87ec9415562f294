use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 店铺实体，对应 tb_shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ShopEntity {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
    /// 图片，多个以逗号分隔
    pub images: String,
    /// 商圈
    pub area: Option<String>,
    pub address: String,
    /// 经度
    pub x: f64,
    /// 纬度
    pub y: f64,
    /// 人均价格（元）
    pub avg_price: Option<i64>,
    pub sold: i32,
    pub comments: i32,
    /// 评分，1~5 分乘 10 保存
    pub score: i32,
    pub open_hours: Option<String>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// 店铺更新请求，`None` 的字段保持原值
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopUpdate {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub type_id: Option<i64>,
    pub images: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub avg_price: Option<i64>,
    pub open_hours: Option<String>,
}

impl ShopUpdate {
    /// 把非空字段写到实体上
    pub fn apply_to(&self, shop: &mut ShopEntity) {
        if let Some(name) = &self.name {
            shop.name = name.clone();
        }
        if let Some(type_id) = self.type_id {
            shop.type_id = type_id;
        }
        if let Some(images) = &self.images {
            shop.images = images.clone();
        }
        if let Some(area) = &self.area {
            shop.area = Some(area.clone());
        }
        if let Some(address) = &self.address {
            shop.address = address.clone();
        }
        if let Some(x) = self.x {
            shop.x = x;
        }
        if let Some(y) = self.y {
            shop.y = y;
        }
        if let Some(avg_price) = self.avg_price {
            shop.avg_price = Some(avg_price);
        }
        if let Some(open_hours) = &self.open_hours {
            shop.open_hours = Some(open_hours.clone());
        }
        shop.update_time = Utc::now();
    }
}
