use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("本次会话没有缓存 sudo 密码")]
    MissingCredential,

    #[error("sudo 预认证失败，请检查密码")]
    AuthenticationFailed,

    #[error("非法的包名: {0:?}")]
    InvalidPackageName(String),

    #[error("未找到 AUR 助手 (yay/paru)")]
    NoHelper,

    #[error("无法读取配置文件 {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件 {path} 格式错误: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
