//! 内存版关系库，实现全部存储库接口，供测试注入。
//!
//! `find_by_ids` 按主键升序返回，不保留请求顺序，和真实数据库的 `IN` 查询一样需要调用方重排。

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::models::{BlogEntity, NewBlog, ShopEntity, ShopUpdate, UserEntity};
use super::repositories::{BlogRepository, FollowRepository, ShopRepository, UserRepository};
use crate::error::AppResult;

#[derive(Default)]
struct Tables {
    shops: BTreeMap<i64, ShopEntity>,
    blogs: BTreeMap<i64, BlogEntity>,
    users: BTreeMap<i64, UserEntity>,
    /// (user_id, follow_user_id)
    follows: BTreeSet<(i64, i64)>,
    next_blog_id: i64,
}

#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_shop(&self, shop: ShopEntity) {
        self.tables.lock().await.shops.insert(shop.id, shop);
    }

    pub async fn add_user(&self, id: i64, nick_name: &str) -> UserEntity {
        let now = Utc::now();
        let user = UserEntity {
            id,
            phone: format!("138{:08}", id),
            nick_name: nick_name.to_string(),
            icon: format!("/imgs/icons/{}.jpg", id),
            create_time: now,
            update_time: now,
        };
        self.tables.lock().await.users.insert(id, user.clone());
        user
    }

    /// 直接写关系表，不经过缓存
    pub async fn add_follow(&self, user_id: i64, follow_user_id: i64) {
        self.tables
            .lock()
            .await
            .follows
            .insert((user_id, follow_user_id));
    }
}

#[async_trait]
impl ShopRepository for MemoryDatabase {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ShopEntity>> {
        Ok(self.tables.lock().await.shops.get(&id).cloned())
    }

    async fn find_by_type(
        &self,
        type_id: i64,
        page: u32,
        page_size: u32,
    ) -> AppResult<Vec<ShopEntity>> {
        let skip = page.saturating_sub(1) as usize * page_size as usize;
        let tables = self.tables.lock().await;
        Ok(tables
            .shops
            .values()
            .filter(|shop| shop.type_id == type_id)
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, update: &ShopUpdate) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables.shops.get_mut(&id) {
            Some(shop) => {
                update.apply_to(shop);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BlogRepository for MemoryDatabase {
    async fn insert(&self, author_id: i64, blog: &NewBlog) -> AppResult<BlogEntity> {
        let mut tables = self.tables.lock().await;
        tables.next_blog_id += 1;
        let now = Utc::now();
        let entity = BlogEntity {
            id: tables.next_blog_id,
            shop_id: blog.shop_id,
            user_id: author_id,
            title: blog.title.clone(),
            images: blog.images.clone(),
            content: blog.content.clone(),
            liked: 0,
            comments: 0,
            create_time: now,
            update_time: now,
        };
        tables.blogs.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<BlogEntity>> {
        Ok(self.tables.lock().await.blogs.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<BlogEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .blogs
            .values()
            .filter(|blog| ids.contains(&blog.id))
            .cloned()
            .collect())
    }

    async fn find_hot(&self, page: u32, page_size: u32) -> AppResult<Vec<BlogEntity>> {
        let tables = self.tables.lock().await;
        let mut blogs: Vec<BlogEntity> = tables.blogs.values().cloned().collect();
        blogs.sort_by(|a, b| b.liked.cmp(&a.liked).then(b.id.cmp(&a.id)));
        let skip = page.saturating_sub(1) as usize * page_size as usize;
        Ok(blogs.into_iter().skip(skip).take(page_size as usize).collect())
    }

    async fn adjust_liked(&self, id: i64, delta: i32) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables.blogs.get_mut(&id) {
            Some(blog) => {
                blog.liked += delta;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserEntity>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<UserEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<UserEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|user| user.phone == phone).cloned())
    }

    async fn create(&self, phone: &str, nick_name: &str) -> AppResult<UserEntity> {
        let mut tables = self.tables.lock().await;
        let id = tables.users.keys().next_back().map_or(1, |last| last + 1);
        let now = Utc::now();
        let user = UserEntity {
            id,
            phone: phone.to_string(),
            nick_name: nick_name.to_string(),
            icon: String::new(),
            create_time: now,
            update_time: now,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl FollowRepository for MemoryDatabase {
    async fn insert(&self, user_id: i64, follow_user_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .follows
            .insert((user_id, follow_user_id)))
    }

    async fn delete(&self, user_id: i64, follow_user_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .follows
            .remove(&(user_id, follow_user_id)))
    }

    async fn exists(&self, user_id: i64, follow_user_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .follows
            .contains(&(user_id, follow_user_id)))
    }

    async fn follower_ids(&self, follow_user_id: i64) -> AppResult<Vec<i64>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .follows
            .iter()
            .filter(|(_, followee)| *followee == follow_user_id)
            .map(|(follower, _)| *follower)
            .collect())
    }
}
