pub mod blog;
pub mod follow;
pub mod shop;
pub mod user;
