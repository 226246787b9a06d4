use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("STUDENT_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("STUDENT_SERVICE_PORT")
            .unwrap_or_else(|_| "3005".to_string())
            .parse()
            .context("STUDENT_SERVICE_PORT must be a valid port number")?;

        let db_url = env::var("STUDENT_DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name =
            env::var("STUDENT_DATABASE_NAME").unwrap_or_else(|_| "student_db".to_string());

        let upload_dir =
            env::var("STUDENT_UPLOAD_DIR").unwrap_or_else(|_| "uploads/students".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from(upload_dir),
            },
            service_name: "student-service".to_string(),
        })
    }
}
