use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    cache::FeedCursor,
    database::models::{BlogEntity, NewBlog, UserEntity},
    error::{AppError, AppResult},
    middleware::CurrentUser,
    utils::{now_millis, order_by_ids},
};

/// 热门笔记每页条数
pub const HOT_PAGE_SIZE: u32 = 10;
/// 点赞列表展示的人数
pub const TOP_LIKERS: usize = 5;

/// 对外展示的用户信息，不含手机号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub nick_name: String,
    pub icon: String,
}

impl From<UserEntity> for UserSummary {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            nick_name: user.nick_name,
            icon: user.icon,
        }
    }
}

/// 笔记及作者信息、当前用户是否点赞
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogView {
    #[serde(flatten)]
    pub blog: BlogEntity,
    /// 作者昵称
    pub name: String,
    /// 作者头像
    pub icon: String,
    pub is_like: bool,
}

/// 关注流一页
///
/// `min_time` 为空表示没有更多数据，否则下一页带上 `max_score=min_time&offset=offset`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollResult {
    pub list: Vec<BlogView>,
    pub min_time: Option<i64>,
    pub offset: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct HotQuery {
    pub current: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScrollQuery {
    pub max_score: Option<String>,
    pub offset: Option<String>,
}

impl ScrollQuery {
    /// 解析游标，不带参数表示第一页
    pub fn cursor(&self) -> AppResult<FeedCursor> {
        let max_time = match self.max_score.as_deref() {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(t) if t >= 0 => Some(t),
                _ => return Err(AppError::invalid(format!("非法的 max_score: {}", raw))),
            },
        };
        let offset = match self.offset.as_deref() {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| AppError::invalid(format!("非法的 offset: {}", raw)))?
                as usize,
        };
        if max_time.is_none() && offset > 0 {
            return Err(AppError::invalid("offset 需要与 max_score 一起使用"));
        }
        Ok(FeedCursor { max_time, offset })
    }
}

/// 补充作者信息和点赞状态，保持输入顺序
async fn decorate(
    state: &AppState,
    blogs: Vec<BlogEntity>,
    viewer: CurrentUser,
) -> AppResult<Vec<BlogView>> {
    let author_ids: Vec<i64> = blogs
        .iter()
        .map(|b| b.user_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let authors: HashMap<i64, UserEntity> = state
        .users
        .find_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let likes = state.like_ledger();
    let mut views = Vec::with_capacity(blogs.len());
    for blog in blogs {
        let is_like = match viewer.id() {
            Some(user_id) => likes.is_liked(blog.id, user_id).await?,
            None => false,
        };
        let (name, icon) = match authors.get(&blog.user_id) {
            Some(author) => (author.nick_name.clone(), author.icon.clone()),
            None => {
                tracing::warn!("笔记 {} 的作者 {} 不存在", blog.id, blog.user_id);
                (String::new(), String::new())
            }
        };
        views.push(BlogView {
            blog,
            name,
            icon,
            is_like,
        });
    }
    Ok(views)
}

/// 发布笔记并推送给粉丝，返回笔记id
pub async fn save_blog(state: &AppState, author_id: i64, draft: &NewBlog) -> AppResult<i64> {
    if draft.title.trim().is_empty() {
        return Err(AppError::invalid("标题不能为空"));
    }
    if draft.content.trim().is_empty() {
        return Err(AppError::invalid("内容不能为空"));
    }

    let blog = state.blogs.insert(author_id, draft).await?;
    state
        .feed_engine()
        .publish(author_id, blog.id, now_millis())
        .await?;
    Ok(blog.id)
}

pub async fn blog_by_id(state: &AppState, id: i64, viewer: CurrentUser) -> AppResult<BlogView> {
    let blog = state
        .blogs
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("笔记 {} 不存在", id)))?;

    let mut views = decorate(state, vec![blog], viewer).await?;
    views
        .pop()
        .ok_or_else(|| AppError::not_found(format!("笔记 {} 不存在", id)))
}

/// 按点赞数倒序，`page` 从 1 开始
pub async fn hot_blogs(state: &AppState, page: u32, viewer: CurrentUser) -> AppResult<Vec<BlogView>> {
    let blogs = state.blogs.find_hot(page.max(1), HOT_PAGE_SIZE).await?;
    decorate(state, blogs, viewer).await
}

/// 最早点赞的几位用户
pub async fn top_likers(state: &AppState, blog_id: i64) -> AppResult<Vec<UserSummary>> {
    let ids = state.like_ledger().top_likers(blog_id, TOP_LIKERS).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let users = state.users.find_by_ids(&ids).await?;
    Ok(order_by_ids(&ids, users, |u| u.id)
        .into_iter()
        .map(UserSummary::from)
        .collect())
}

/// 关注流分页
pub async fn scroll_follow_feed(
    state: &AppState,
    user_id: i64,
    cursor: FeedCursor,
) -> AppResult<ScrollResult> {
    let page = state
        .feed_engine()
        .scroll(user_id, cursor, state.config.feed_page_size)
        .await?;

    let blogs = if page.ids.is_empty() {
        Vec::new()
    } else {
        let rows = state.blogs.find_by_ids(&page.ids).await?;
        // 已删除的笔记直接跳过
        order_by_ids(&page.ids, rows, |b| b.id)
    };
    let list = decorate(state, blogs, CurrentUser::Authenticated(user_id)).await?;

    let (min_time, offset) = match page.next {
        Some(next) => (next.max_time, next.offset),
        None => (None, 0),
    };
    Ok(ScrollResult {
        list,
        min_time,
        offset,
    })
}
