mod handler;
mod model;

pub use handler::{get_shop, shops_of_type, update_shop};
