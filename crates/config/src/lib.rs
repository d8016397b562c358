use dotenv::dotenv;
use dotenv::from_path;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub api_host: String,
    pub api_port: u16,
    pub assets_dir: String,
}

impl Config {
    /// Load configuration from a specified `.env` file path or default to the root `.env` file.
    pub fn from_env(env_path: Option<&str>) -> Self {
        if let Some(path) = env_path {
            from_path(path).unwrap_or_else(|e| {
                panic!("Failed to load .env file from path {path}: {e}");
            });
        } else {
            dotenv().ok();
        }

        Config {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "wtus_team_system.db".to_string()),

            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            assets_dir: env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_string()),
        }
    }
}
