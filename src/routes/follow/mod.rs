mod handler;
mod model;

pub use handler::{common_follows, follow, is_follow};
