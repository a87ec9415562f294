use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, RedisResult};

/// 远程键值存储抽象
///
/// 只暴露业务用到的命令：字符串、有序集合、集合、位图。
/// 每条命令在存储端是原子的，跨命令的组合操作不是。
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> RedisResult<Option<String>>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> RedisResult<()>;

    /// `SET key value NX EX ttl`，返回是否写入
    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> RedisResult<bool>;

    async fn del(&self, key: &str) -> RedisResult<()>;

    async fn zadd(&self, key: &str, member: &str, score: f64) -> RedisResult<()>;

    /// 返回成员是否存在并被移除
    async fn zrem(&self, key: &str, member: &str) -> RedisResult<bool>;

    async fn zscore(&self, key: &str, member: &str) -> RedisResult<Option<f64>>;

    /// 按分数升序取排名区间 `[start, stop]` 的成员
    async fn zrange(&self, key: &str, start: isize, stop: isize) -> RedisResult<Vec<String>>;

    /// `ZREVRANGEBYSCORE key max min WITHSCORES LIMIT offset count`
    ///
    /// `max` 为正无穷时表示不设上界。
    async fn zrevrange_by_score(
        &self,
        key: &str,
        max: f64,
        min: f64,
        offset: usize,
        count: usize,
    ) -> RedisResult<Vec<(String, f64)>>;

    async fn sadd(&self, key: &str, member: &str) -> RedisResult<()>;

    async fn srem(&self, key: &str, member: &str) -> RedisResult<()>;

    async fn sinter(&self, keys: &[String]) -> RedisResult<Vec<String>>;

    /// 返回该位原来的值
    async fn setbit(&self, key: &str, offset: usize, value: bool) -> RedisResult<bool>;

    /// `BITFIELD key GET u{width} offset`，键不存在时读到 0
    async fn bitfield_get_u(&self, key: &str, width: u8, offset: usize) -> RedisResult<u64>;
}

/// 基于 redis 客户端的实现
#[derive(Clone)]
pub struct RedisStore {
    redis_client: Arc<RedisClient>,
}

impl RedisStore {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    async fn conn(&self) -> RedisResult<redis::aio::MultiplexedConnection> {
        self.redis_client.get_multiplexed_async_connection().await
    }
}

fn score_arg(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> RedisResult<()> {
        let mut conn = self.conn().await?;
        conn.set_ex(key, value, ttl_secs).await
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> RedisResult<bool> {
        let mut conn = self.conn().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn del(&self, key: &str) -> RedisResult<()> {
        let mut conn = self.conn().await?;
        conn.del(key).await
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> RedisResult<()> {
        let mut conn = self.conn().await?;
        conn.zadd(key, member, score).await
    }

    async fn zrem(&self, key: &str, member: &str) -> RedisResult<bool> {
        let mut conn = self.conn().await?;
        let removed: i64 = conn.zrem(key, member).await?;
        Ok(removed > 0)
    }

    async fn zscore(&self, key: &str, member: &str) -> RedisResult<Option<f64>> {
        let mut conn = self.conn().await?;
        conn.zscore(key, member).await
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> RedisResult<Vec<String>> {
        let mut conn = self.conn().await?;
        conn.zrange(key, start, stop).await
    }

    async fn zrevrange_by_score(
        &self,
        key: &str,
        max: f64,
        min: f64,
        offset: usize,
        count: usize,
    ) -> RedisResult<Vec<(String, f64)>> {
        let mut conn = self.conn().await?;
        let entries: Vec<(String, f64)> = redis::cmd("ZREVRANGEBYSCORE")
            .arg(key)
            .arg(score_arg(max))
            .arg(score_arg(min))
            .arg("WITHSCORES")
            .arg("LIMIT")
            .arg(offset)
            .arg(count)
            .query_async(&mut conn)
            .await?;
        Ok(entries)
    }

    async fn sadd(&self, key: &str, member: &str) -> RedisResult<()> {
        let mut conn = self.conn().await?;
        conn.sadd(key, member).await
    }

    async fn srem(&self, key: &str, member: &str) -> RedisResult<()> {
        let mut conn = self.conn().await?;
        conn.srem(key, member).await
    }

    async fn sinter(&self, keys: &[String]) -> RedisResult<Vec<String>> {
        let mut conn = self.conn().await?;
        conn.sinter(keys).await
    }

    async fn setbit(&self, key: &str, offset: usize, value: bool) -> RedisResult<bool> {
        let mut conn = self.conn().await?;
        conn.setbit(key, offset, value).await
    }

    async fn bitfield_get_u(&self, key: &str, width: u8, offset: usize) -> RedisResult<u64> {
        let mut conn = self.conn().await?;
        let values: Vec<Option<i64>> = redis::cmd("BITFIELD")
            .arg(key)
            .arg("GET")
            .arg(format!("u{}", width))
            .arg(offset)
            .query_async(&mut conn)
            .await?;
        Ok(values.first().copied().flatten().unwrap_or(0) as u64)
    }
}
