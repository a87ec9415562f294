use chrono::{Local, NaiveDate};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    error::{AppError, AppResult},
    routes::blog::UserSummary,
    utils::{generate_token, is_phone_valid},
};

/// 新用户默认昵称前缀
const NICK_NAME_PREFIX: &str = "user_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResponse {
    pub date: NaiveDate,
    /// 今天之前是否已经签过
    pub repeated: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: UserSummary,
}

/// 签到按服务器本地日期计算
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn random_nick_name() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}{}", NICK_NAME_PREFIX, suffix)
}

pub async fn send_code(state: &AppState, phone: &str) -> AppResult<()> {
    if !is_phone_valid(phone) {
        return Err(AppError::invalid("手机号格式错误"));
    }
    state.login_codes().send(phone).await?;
    Ok(())
}

/// 验证码登录，新手机号自动注册
pub async fn login(state: &AppState, req: &LoginRequest) -> AppResult<LoginResponse> {
    if !is_phone_valid(&req.phone) {
        return Err(AppError::invalid("手机号格式错误"));
    }
    state.login_codes().verify(&req.phone, &req.code).await?;

    let user = match state.users.find_by_phone(&req.phone).await? {
        Some(user) => user,
        None => state.users.create(&req.phone, &random_nick_name()).await?,
    };

    let (token, expires_at) = generate_token(user.id, &state.config)?;

    tracing::info!("User {} logged in", user.id);
    Ok(LoginResponse {
        token,
        expires_at,
        user: user.into(),
    })
}

pub async fn me(state: &AppState, user_id: i64) -> AppResult<UserSummary> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .map(UserSummary::from)
        .ok_or_else(|| AppError::not_found(format!("用户 {} 不存在", user_id)))
}

pub async fn sign(state: &AppState, user_id: i64, date: NaiveDate) -> AppResult<SignResponse> {
    let repeated = state.attendance().mark_today(user_id, date).await?;
    Ok(SignResponse { date, repeated })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        cache::{KvStore, MemoryStore, keys::login_code_key},
        config::Config,
        database::MemoryDatabase,
        utils::verify_token,
    };

    async fn state() -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let db = Arc::new(MemoryDatabase::new());
        db.add_user(1, "小鱼同学").await;
        (AppState::in_memory(Config::default(), store.clone(), db), store)
    }

    async fn code_for(store: &MemoryStore, phone: &str) -> String {
        store.get(&login_code_key(phone)).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn new_phone_registers_and_gets_token() {
        let (state, store) = state().await;
        let phone = "13912345678";
        send_code(&state, phone).await.unwrap();
        let code = code_for(&store, phone).await;

        let resp = login(
            &state,
            &LoginRequest {
                phone: phone.into(),
                code,
            },
        )
        .await
        .unwrap();
        assert!(resp.user.nick_name.starts_with(NICK_NAME_PREFIX));
        assert_eq!(resp.user.nick_name.len(), NICK_NAME_PREFIX.len() + 8);

        let claims = verify_token(&resp.token, &state.config).unwrap();
        assert_eq!(claims.user_id(), Some(resp.user.id));
        assert_eq!(me(&state, resp.user.id).await.unwrap(), resp.user);
    }

    #[tokio::test]
    async fn existing_phone_logs_into_same_user() {
        let (state, store) = state().await;
        // add_user(1, ..) 的手机号
        let phone = "13800000001";
        send_code(&state, phone).await.unwrap();
        let code = code_for(&store, phone).await;

        let resp = login(
            &state,
            &LoginRequest {
                phone: phone.into(),
                code,
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.user.id, 1);
        assert_eq!(resp.user.nick_name, "小鱼同学");
    }

    #[tokio::test]
    async fn invalid_phone_and_wrong_code_are_rejected() {
        let (state, store) = state().await;
        let err = send_code(&state, "12345").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let phone = "13912345678";
        send_code(&state, phone).await.unwrap();
        let code = code_for(&store, phone).await;
        let wrong = if code == "000000" { "000001" } else { "000000" };
        let err = login(
            &state,
            &LoginRequest {
                phone: phone.into(),
                code: wrong.into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(
            state
                .users
                .find_by_phone(phone)
                .await
                .unwrap()
                .is_none()
        );
    }
}
