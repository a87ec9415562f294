/// 点赞集合键前缀
const BLOG_LIKE_PREFIX: &str = "like:";

/// 收件箱键前缀
const FEED_PREFIX: &str = "feed:";

/// 生成笔记点赞集合键
pub fn blog_like_key(blog_id: i64) -> String {
    format!("{}{}", BLOG_LIKE_PREFIX, blog_id)
}

/// 生成用户收件箱键
pub fn feed_key(user_id: i64) -> String {
    format!("{}{}", FEED_PREFIX, user_id)
}
