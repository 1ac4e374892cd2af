//! 会话：缓存 sudo 密码，在每次特权操作前预认证

use super::streaming::run_sudo_primed;
use super::types::CommandLine;
use crate::error::{Error, Result};
use std::fmt;

#[derive(Clone)]
pub struct Session {
    credential: Option<String>,
    prime_command: CommandLine,
}

impl Session {
    pub fn new(prime_command: CommandLine) -> Self {
        Self {
            credential: None,
            prime_command,
        }
    }

    /// 缓存密码；空字符串视为未提供
    pub fn set_password(&mut self, password: String) {
        self.credential = (!password.is_empty()).then_some(password);
    }

    pub fn with_password(mut self, password: String) -> Self {
        self.set_password(password);
        self
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// 运行 `sudo -S -v` 刷新凭证，之后 yay 内部调用 sudo 时不会再次询问密码
    pub fn authenticate(&self) -> Result<()> {
        let password = self.credential.as_deref().ok_or(Error::MissingCredential)?;
        if run_sudo_primed(password, &self.prime_command) {
            Ok(())
        } else {
            log::warn!("{} 失败", self.prime_command);
            Err(Error::AuthenticationFailed)
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("prime_command", &self.prime_command)
            .finish()
    }
}
