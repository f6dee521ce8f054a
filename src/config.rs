use std::env;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

pub const DB_FILE_NAME: &str = "ricemill.db";
const APP_DIR_NAME: &str = "ricemill";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Reads `RICEMILL_DATA_DIR`, falling back to the per-user data directory.
    pub fn from_env() -> AppResult<Self> {
        let data_dir = match env::var_os("RICEMILL_DATA_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::data_dir()
                .ok_or_else(|| AppError::failed("no per-user data directory on this platform"))?
                .join(APP_DIR_NAME),
        };
        Ok(Self { data_dir })
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_lives_in_data_dir() {
        let config = AppConfig::with_data_dir("/tmp/mill");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/mill/ricemill.db"));
    }
}
