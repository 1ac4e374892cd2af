use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AUR 助手；未设置时按 yay -> paru 顺序检测
    pub helper: Option<String>,
    /// 查询本地包数据库的工具
    pub query_tool: String,
    /// sudo 预认证命令，密码从 stdin 读入
    pub sudo_prime: Vec<String>,
    pub search_args: Vec<String>,
    pub install_args: Vec<String>,
    pub remove_args: Vec<String>,
    pub clean_args: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            helper: None,
            query_tool: "pacman".to_string(),
            sudo_prime: strings(&["sudo", "-S", "-v"]),
            search_args: strings(&["-Ss"]),
            install_args: strings(&[
                "-S",
                "--noconfirm",
                "--answerclean",
                "None",
                "--answerdiff",
                "None",
                "--answeredit",
                "None",
            ]),
            remove_args: strings(&["-Rns", "--noconfirm"]),
            clean_args: strings(&["-Yc", "--noconfirm"]),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/pkgcenter/config.toml")
    }

    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            log::debug!("配置文件 {} 不存在，使用默认配置", config_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|source| Error::ConfigRead {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: config_path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }
}
