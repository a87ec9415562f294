//! 内存版键值存储，行为对齐 redis 的相关命令，供测试和本地调试注入使用。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redis::RedisResult;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::store::KvStore;

enum Value {
    Str {
        value: String,
        expires_at: Option<Instant>,
    },
    ZSet(HashMap<String, f64>),
    Set(HashSet<String>),
    Bits(Vec<u8>),
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Value>>,
    unavailable: AtomicBool,
}

fn wrong_type() -> redis::RedisError {
    redis::RedisError::from((
        redis::ErrorKind::TypeError,
        "WRONGTYPE Operation against a key holding the wrong kind of value",
    ))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟存储宕机，之后的所有命令返回 IO 错误
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 键是否存在（已过期的字符串视为不存在）
    pub async fn contains_key(&self, key: &str) -> bool {
        let mut data = self.data.lock().await;
        purge_expired(&mut data, key);
        data.contains_key(key)
    }

    fn check(&self) -> RedisResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            )));
        }
        Ok(())
    }
}

fn purge_expired(data: &mut HashMap<String, Value>, key: &str) {
    let expired = matches!(
        data.get(key),
        Some(Value::Str { expires_at: Some(at), .. }) if *at <= Instant::now()
    );
    if expired {
        data.remove(key);
    }
}

/// redis 有序集合的排序：分数优先，分数相同按成员字典序
fn sorted_members(zset: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut entries: Vec<(String, f64)> = zset.iter().map(|(m, s)| (m.clone(), *s)).collect();
    entries.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

fn bit_at(bits: &[u8], offset: usize) -> bool {
    bits.get(offset / 8)
        .map(|byte| byte & (0x80 >> (offset % 8)) != 0)
        .unwrap_or(false)
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> RedisResult<Option<String>> {
        self.check()?;
        let mut data = self.data.lock().await;
        purge_expired(&mut data, key);
        match data.get(key) {
            Some(Value::Str { value, .. }) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type()),
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> RedisResult<()> {
        self.check()?;
        let mut data = self.data.lock().await;
        data.insert(
            key.to_string(),
            Value::Str {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
            },
        );
        Ok(())
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> RedisResult<bool> {
        self.check()?;
        let mut data = self.data.lock().await;
        purge_expired(&mut data, key);
        if data.contains_key(key) {
            return Ok(false);
        }
        data.insert(
            key.to_string(),
            Value::Str {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
            },
        );
        Ok(true)
    }

    async fn del(&self, key: &str) -> RedisResult<()> {
        self.check()?;
        self.data.lock().await.remove(key);
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> RedisResult<()> {
        self.check()?;
        let mut data = self.data.lock().await;
        match data
            .entry(key.to_string())
            .or_insert_with(|| Value::ZSet(HashMap::new()))
        {
            Value::ZSet(zset) => {
                zset.insert(member.to_string(), score);
                Ok(())
            }
            _ => Err(wrong_type()),
        }
    }

    async fn zrem(&self, key: &str, member: &str) -> RedisResult<bool> {
        self.check()?;
        let mut data = self.data.lock().await;
        let (removed, now_empty) = match data.get_mut(key) {
            Some(Value::ZSet(zset)) => (zset.remove(member).is_some(), zset.is_empty()),
            Some(_) => return Err(wrong_type()),
            None => (false, false),
        };
        if now_empty {
            data.remove(key);
        }
        Ok(removed)
    }

    async fn zscore(&self, key: &str, member: &str) -> RedisResult<Option<f64>> {
        self.check()?;
        match self.data.lock().await.get(key) {
            Some(Value::ZSet(zset)) => Ok(zset.get(member).copied()),
            Some(_) => Err(wrong_type()),
            None => Ok(None),
        }
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> RedisResult<Vec<String>> {
        self.check()?;
        let data = self.data.lock().await;
        let entries = match data.get(key) {
            Some(Value::ZSet(zset)) => sorted_members(zset),
            Some(_) => return Err(wrong_type()),
            None => return Ok(Vec::new()),
        };
        let len = entries.len() as isize;
        let resolve = |idx: isize| if idx < 0 { len + idx } else { idx };
        let (start, stop) = (resolve(start).max(0), resolve(stop).min(len - 1));
        if start > stop {
            return Ok(Vec::new());
        }
        Ok(entries[start as usize..=stop as usize]
            .iter()
            .map(|(member, _)| member.clone())
            .collect())
    }

    async fn zrevrange_by_score(
        &self,
        key: &str,
        max: f64,
        min: f64,
        offset: usize,
        count: usize,
    ) -> RedisResult<Vec<(String, f64)>> {
        self.check()?;
        let data = self.data.lock().await;
        let entries = match data.get(key) {
            Some(Value::ZSet(zset)) => sorted_members(zset),
            Some(_) => return Err(wrong_type()),
            None => return Ok(Vec::new()),
        };
        // 逆序遍历：分数降序，同分按成员字典序逆序，与 ZREVRANGEBYSCORE 一致
        Ok(entries
            .into_iter()
            .rev()
            .filter(|(_, score)| *score <= max && *score >= min)
            .skip(offset)
            .take(count)
            .collect())
    }

    async fn sadd(&self, key: &str, member: &str) -> RedisResult<()> {
        self.check()?;
        let mut data = self.data.lock().await;
        match data
            .entry(key.to_string())
            .or_insert_with(|| Value::Set(HashSet::new()))
        {
            Value::Set(set) => {
                set.insert(member.to_string());
                Ok(())
            }
            _ => Err(wrong_type()),
        }
    }

    async fn srem(&self, key: &str, member: &str) -> RedisResult<()> {
        self.check()?;
        let mut data = self.data.lock().await;
        let now_empty = match data.get_mut(key) {
            Some(Value::Set(set)) => {
                set.remove(member);
                set.is_empty()
            }
            Some(_) => return Err(wrong_type()),
            None => false,
        };
        if now_empty {
            data.remove(key);
        }
        Ok(())
    }

    async fn sinter(&self, keys: &[String]) -> RedisResult<Vec<String>> {
        self.check()?;
        let data = self.data.lock().await;
        let mut sets = Vec::with_capacity(keys.len());
        for key in keys {
            match data.get(key) {
                Some(Value::Set(set)) => sets.push(set),
                Some(_) => return Err(wrong_type()),
                // 任意一个集合不存在，交集为空
                None => return Ok(Vec::new()),
            }
        }
        let Some((first, rest)) = sets.split_first() else {
            return Ok(Vec::new());
        };
        Ok(first
            .iter()
            .filter(|member| rest.iter().all(|set| set.contains(*member)))
            .cloned()
            .collect())
    }

    async fn setbit(&self, key: &str, offset: usize, value: bool) -> RedisResult<bool> {
        self.check()?;
        let mut data = self.data.lock().await;
        match data
            .entry(key.to_string())
            .or_insert_with(|| Value::Bits(Vec::new()))
        {
            Value::Bits(bits) => {
                let previous = bit_at(bits, offset);
                let byte = offset / 8;
                if bits.len() <= byte {
                    bits.resize(byte + 1, 0);
                }
                let mask = 0x80u8 >> (offset % 8);
                if value {
                    bits[byte] |= mask;
                } else {
                    bits[byte] &= !mask;
                }
                Ok(previous)
            }
            _ => Err(wrong_type()),
        }
    }

    async fn bitfield_get_u(&self, key: &str, width: u8, offset: usize) -> RedisResult<u64> {
        self.check()?;
        let data = self.data.lock().await;
        let bits: &[u8] = match data.get(key) {
            Some(Value::Bits(bits)) => bits.as_slice(),
            Some(_) => return Err(wrong_type()),
            None => &[],
        };
        // 大端读取：offset 处的位是最高位
        Ok((0..width as usize).fold(0u64, |acc, i| {
            (acc << 1) | u64::from(bit_at(bits, offset + i))
        }))
    }
}
