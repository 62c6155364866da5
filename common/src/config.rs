use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Helper trait for dispatching fs ops for different config files
pub trait ConfigManager: Sized {
    fn directory(&self) -> PathBuf;

    fn filename(&self) -> PathBuf;

    fn path(&self) -> PathBuf {
        self.directory().join(self.filename())
    }

    fn exists(&self) -> bool {
        self.path().exists()
    }

    fn open<C>(&self) -> Result<C>
    where
        C: for<'de> Deserialize<'de>,
    {
        let path = self.path();
        let config_string = File::open(&path)
            .and_then(|mut f| {
                let mut buf = String::new();
                f.read_to_string(&mut buf)?;
                Ok(buf)
            })
            .with_context(|| anyhow!("Unable to read configuration file: {}", path.display()))?;
        toml::from_str(config_string.as_str())
            .with_context(|| anyhow!("Invalid configuration file: {}", path.display()))
    }
}

/// The per-user config file, `~/.config/<app>/config.toml`
pub struct GlobalConfigManager {
    app_name: String,
    env_override: Option<String>,
}

impl GlobalConfigManager {
    pub fn new(app_name: String, env_override: Option<String>) -> Result<Self> {
        if let Some(ref s) = env_override {
            if s.chars().any(|c| !c.is_ascii_alphanumeric()) {
                return Err(anyhow!("Invalid config environment name"));
            }
        }

        Ok(Self {
            app_name,
            env_override,
        })
    }
}

impl ConfigManager for GlobalConfigManager {
    fn directory(&self) -> PathBuf {
        // platforms without a config dir get a relative path that normally won't exist
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(&self.app_name)
    }

    fn filename(&self) -> PathBuf {
        match self.env_override.as_ref() {
            Some(env) => PathBuf::from(format!("config.{env}.toml")),
            None => PathBuf::from("config.toml"),
        }
    }
}

/// An impl of [`ConfigManager`] which is localised to a working directory
pub struct LocalConfigManager {
    directory: PathBuf,
    file_name: String,
}

impl LocalConfigManager {
    pub fn new<P: AsRef<Path>>(directory: P, file_name: String) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            file_name,
        }
    }
}

impl ConfigManager for LocalConfigManager {
    fn directory(&self) -> PathBuf {
        self.directory.clone()
    }

    fn filename(&self) -> PathBuf {
        PathBuf::from(&self.file_name)
    }
}
