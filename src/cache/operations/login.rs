use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::cache::keys::login_code_key;
use crate::cache::store::KvStore;
use crate::error::{AppError, AppResult};

/// 验证码有效期
pub const LOGIN_CODE_TTL: Duration = Duration::from_secs(2 * 60);

/// 短信登录验证码
///
/// `login:code:{phone}` 保存 6 位数字验证码，有效期内重复发送不会换码，
/// 登录成功后删除。
pub struct LoginCodes {
    store: Arc<dyn KvStore>,
}

fn random_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

impl LoginCodes {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// 生成并保存验证码，返回是否生成了新码
    pub async fn send(&self, phone: &str) -> AppResult<bool> {
        let code = random_code();
        let created = self
            .store
            .set_nx_ex(&login_code_key(phone), &code, LOGIN_CODE_TTL.as_secs())
            .await?;

        if created {
            // 不接短信网关，验证码只打到日志里
            tracing::info!("Login code for {}: {}", phone, code);
        } else {
            tracing::debug!("Login code for {} still valid, not resent", phone);
        }
        Ok(created)
    }

    /// 校验验证码，通过后作废
    pub async fn verify(&self, phone: &str, code: &str) -> AppResult<()> {
        let key = login_code_key(phone);
        let expected = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| AppError::invalid("验证码已过期或手机号不一致"))?;
        if expected != code {
            return Err(AppError::invalid("验证码不正确"));
        }

        if let Err(e) = self.store.del(&key).await {
            tracing::warn!("删除验证码失败 {}: {}", key, e);
        }
        Ok(())
    }
}
