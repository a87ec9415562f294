use chrono::{Datelike, NaiveDate};

/// 关注集合键前缀
const FOLLOWS_PREFIX: &str = "follows:";

/// 签到位图键前缀
const SIGN_PREFIX: &str = "sign:";

/// 登录验证码键前缀
const LOGIN_CODE_PREFIX: &str = "login:code:";

/// 生成登录验证码键 `login:code:{phone}`
pub fn login_code_key(phone: &str) -> String {
    format!("{}{}", LOGIN_CODE_PREFIX, phone)
}

/// 生成用户关注集合键
pub fn follows_key(user_id: i64) -> String {
    format!("{}{}", FOLLOWS_PREFIX, user_id)
}

/// 生成用户月度签到键 `sign:{userId}:{yyyyMM}`
pub fn sign_key(user_id: i64, date: NaiveDate) -> String {
    format!("{}{}:{:04}{:02}", SIGN_PREFIX, user_id, date.year(), date.month())
}
