mod handler;
mod model;

pub use handler::{get_blog, hot_blogs, like_blog, likes_of_blog, of_follow, save_blog};
pub use model::{BlogView, ScrollResult, UserSummary};
