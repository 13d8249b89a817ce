//! Configuration for Products API

use core_config::{app_info, env_flag, server::ServerConfig, AppInfo, FromEnv};
use database::mongodb::MongoConfig;
use std::path::PathBuf;

pub use core_config::Environment;

/// Opt-in unique index on `name`
pub const UNIQUE_NAME_INDEX_ENV: &str = "PRODUCTS_UNIQUE_NAME_INDEX";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub unique_name_index: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            mongodb: MongoConfig::from_env()?,
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
            unique_name_index: env_flag(UNIQUE_NAME_INDEX_ENV, false)?,
        })
    }
}

/// The `.env` load error worth reporting. A missing file is not one.
pub fn dotenv_problem(loaded: &Result<PathBuf, dotenvy::Error>) -> Option<&dotenvy::Error> {
    loaded.as_ref().err().filter(|e| !e.not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_dotenv_problem_ignores_only_missing_file() {
        assert!(dotenv_problem(&Ok(PathBuf::from(".env"))).is_none());

        let missing = dotenvy::Error::Io(io::Error::new(io::ErrorKind::NotFound, ".env"));
        assert!(dotenv_problem(&Err(missing)).is_none());

        let malformed = dotenvy::Error::LineParse("MONGO_URL mongodb://db".to_string(), 9);
        assert!(dotenv_problem(&Err(malformed)).is_some());

        let unreadable =
            dotenvy::Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, ".env"));
        assert!(dotenv_problem(&Err(unreadable)).is_some());
    }

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None),
                ("MONGO_URL", Some("mongodb://db:27017")),
                ("MONGODB_DATABASE", None),
                ("MONGO_DATABASE", None),
                ("PORT", None),
                (UNIQUE_NAME_INDEX_ENV, None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mongodb.url(), "mongodb://db:27017");
                assert_eq!(config.mongodb.database(), "product_management");
                assert_eq!(config.server.port, 8080);
                assert!(!config.unique_name_index);
                assert_eq!(config.app.name, "products_api");
            },
        );
    }

    #[test]
    fn test_from_env_requires_mongo_url() {
        temp_env::with_vars_unset(["MONGODB_URL", "MONGO_URL"], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_unique_name_index_flag() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://db:27017")),
                (UNIQUE_NAME_INDEX_ENV, Some("yes")),
            ],
            || assert!(Config::from_env().unwrap().unique_name_index),
        );

        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://db:27017")),
                (UNIQUE_NAME_INDEX_ENV, Some("sometimes")),
            ],
            || assert!(Config::from_env().is_err()),
        );
    }
}
