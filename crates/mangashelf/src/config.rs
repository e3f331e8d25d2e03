use std::path::{Path, PathBuf};
use std::time::Duration;

use mangashelf_lib::paging::DEFAULT_LIMIT;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_cover_base_url")]
    pub cover_base_url: String,
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Seconds, unset means no timeout
    #[serde(default)]
    pub request_timeout: Option<u64>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: mangashelf_home().join("config.yml"),
            base_url: default_base_url(),
            cover_base_url: default_cover_base_url(),
            store_path: default_store_path(),
            request_timeout: None,
            page_size: default_page_size(),
        }
    }
}

fn mangashelf_home() -> PathBuf {
    match std::env::var("MANGASHELF_HOME") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mangashelf"),
    }
}

fn default_base_url() -> String {
    mangashelf_mangadex::DEFAULT_BASE_URL.to_string()
}

fn default_cover_base_url() -> String {
    "https://uploads.mangadex.org".to_string()
}

fn default_store_path() -> String {
    mangashelf_home().join("library.json").display().to_string()
}

fn default_page_size() -> usize {
    DEFAULT_LIMIT
}

impl Config {
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Config, anyhow::Error> {
        let config_path = match path {
            Some(p) => PathBuf::new().join(p),
            None => mangashelf_home().join("config.yml"),
        };

        match std::fs::File::open(&config_path) {
            Ok(file) => {
                info!("Open config from {:?}", config_path);
                let mut cfg: Self = serde_yml::from_reader(file)?;
                cfg.path = config_path;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Config {
                    path: config_path,
                    ..Default::default()
                };
                cfg.save()?;
                info!("Write default config at {:?}", cfg.path);
                Ok(cfg)
            }
        }
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_yml::to_string(&self)?)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }

    /// Resolve a relative `/uploads/...` cover path against the cover host
    pub fn cover_url(&self, cover: &str) -> String {
        match cover.strip_prefix("/uploads") {
            Some(rest) => format!("{}{}", self.cover_base_url.trim_end_matches('/'), rest),
            None => cover.to_string(),
        }
    }
}
