use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct InkstreamConfig {
    pub api_port: u16,
    pub paths: InkstreamPaths,
    pub auth: AuthConfig,
}

impl InkstreamConfig {
    pub fn from_env() -> Result<Self> {
        let paths = InkstreamPaths::discover()?;
        let api_port = env::var("INKSTREAM_API_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8080);
        let auth = AuthConfig::from_env();
        Ok(Self {
            api_port,
            paths,
            auth,
        })
    }

    pub fn new(api_port: u16, paths: InkstreamPaths, auth: AuthConfig) -> Self {
        Self {
            api_port,
            paths,
            auth,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InkstreamPaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub uploads_dir: PathBuf,
}

impl InkstreamPaths {
    pub fn discover() -> Result<Self> {
        if let Some(dir) = env::var_os("INKSTREAM_DATA_DIR") {
            return Self::from_base_dir(PathBuf::from(dir));
        }
        let exe_path = std::env::current_exe()
            .map_err(|err| anyhow!("failed to resolve current executable: {err}"))?;
        let base = exe_path
            .parent()
            .ok_or_else(|| anyhow!("executable path missing parent"))?
            .to_path_buf();
        Self::from_base_dir(base)
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        let db_path = data_dir.join("inkstream.db");
        let uploads_dir = base.join("uploads");
        Ok(Self {
            base,
            data_dir,
            db_path,
            uploads_dir,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = env::var("INKSTREAM_JWT_SECRET")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| {
                tracing::warn!("INKSTREAM_JWT_SECRET not set, using an insecure default");
                "inkstream-dev-secret".to_string()
            });
        let token_ttl_hours = env::var("INKSTREAM_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(24 * 7);
        Self {
            jwt_secret,
            token_ttl_hours,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "inkstream-dev-secret".to_string(),
            token_ttl_hours: 24 * 7,
        }
    }
}
