use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::cache::keys::sign_key;
use crate::cache::store::KvStore;
use crate::error::AppResult;

/// 月度签到位图
///
/// `sign:{userId}:{yyyyMM}` 的第 `day-1` 位表示当月第 `day` 天是否签到。
/// 连续签到只统计本月，跨月从 0 开始。
pub struct AttendanceCounter {
    store: Arc<dyn KvStore>,
}

impl AttendanceCounter {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// 当天签到，重复签到无副作用
    ///
    /// 返回当天此前是否已经签过。
    pub async fn mark_today(&self, user_id: i64, today: NaiveDate) -> AppResult<bool> {
        let offset = today.day0() as usize;
        let already = self
            .store
            .setbit(&sign_key(user_id, today), offset, true)
            .await?;
        tracing::debug!("User {} signed on {} (repeat: {})", user_id, today, already);
        Ok(already)
    }

    /// 截至今天（含）的连续签到天数，今天没签返回 0
    pub async fn current_streak(&self, user_id: i64, today: NaiveDate) -> AppResult<u32> {
        let day = today.day();
        // 第 1 天在最高位，今天在最低位
        let field = self
            .store
            .bitfield_get_u(&sign_key(user_id, today), day as u8, 0)
            .await?;
        Ok(trailing_streak(field, day))
    }
}

/// 从最低位开始数连续的 1，最多数 `width` 位
fn trailing_streak(field: u64, width: u32) -> u32 {
    field.trailing_ones().min(width)
}
