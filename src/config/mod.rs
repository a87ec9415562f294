use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub shop_cache_ttl_secs: u64,
    pub feed_page_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = optional_env("JWT_EXPIRATION", "24h")
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        let shop_cache_ttl = optional_env("SHOP_CACHE_TTL", "30m")
            .trim_end_matches('m')
            .parse::<u64>()
            .unwrap_or(30);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            server_host: optional_env("SERVER_HOST", "::"),
            server_port: parse_env("SERVER_PORT", 3000),
            api_base_uri: optional_env("API_BASE_URI", "/api"),
            shop_cache_ttl_secs: shop_cache_ttl * 60,
            feed_page_size: parse_env("FEED_PAGE_SIZE", 10).max(1),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn shop_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.shop_cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/tandian".into(),
            redis_url: "redis://127.0.0.1/".into(),
            jwt_secret: "tandian-dev-secret".into(),
            jwt_expiration_secs: 24 * 3600,
            server_host: "::".into(),
            server_port: 3000,
            api_base_uri: "/api".into(),
            shop_cache_ttl_secs: 30 * 60,
            feed_page_size: 10,
        }
    }
}

fn optional_env(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_derived_from_seconds() {
        let config = Config::default();
        assert_eq!(config.shop_cache_ttl(), Duration::from_secs(1800));
        assert_eq!(config.jwt_expiration(), Duration::from_secs(86400));
    }

    #[test]
    fn unparsable_values_fall_back_to_default() {
        // 未设置的变量同样走默认值
        assert_eq!(parse_env("TANDIAN_TEST_UNSET_PORT", 3000u16), 3000);
    }
}
