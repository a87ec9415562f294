mod handler;
mod model;

pub use handler::{login, me, send_code, sign, sign_streak};
pub use model::{LoginResponse, SignResponse};
