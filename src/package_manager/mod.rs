//! 包管理器模块 — 对 yay / paru 的封装

pub mod parser;
pub mod resolver;
pub mod session;
pub mod streaming;
pub mod types;

pub use resolver::{InstalledCheck, PackageDatabase};
pub use session::Session;
pub use types::{CommandLine, CommandOutput, PackageRecord, SearchSummary};

use crate::config::Config;
use crate::error::{Error, Result};
use parser::{clean_terminal_output, parse_search_output};
use resolver::resolve_installed;
use streaming::{run_capturing, run_for_status, run_silently, run_streaming};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct PackageManager {
    pub command: String,
    config: Config,
    database: PackageDatabase,
}

impl PackageManager {
    pub fn new(command: impl Into<String>, config: Config) -> Self {
        let database = PackageDatabase::new(config.query_tool.as_str());
        Self {
            command: command.into(),
            config,
            database,
        }
    }

    /// 使用配置中的助手；未配置时按 yay -> paru 检测
    pub fn detect(config: Config) -> Result<Self> {
        if let Some(helper) = config.helper.clone() {
            return Ok(Self::new(helper, config));
        }
        for pm in ["yay", "paru"] {
            if run_silently(&CommandLine::new("which").arg(pm)) {
                log::debug!("检测到 AUR 助手: {}", pm);
                return Ok(Self::new(pm, config));
            }
        }
        Err(Error::NoHelper)
    }

    /// 新建会话，预认证命令取自配置
    pub fn session(&self) -> Session {
        let prime = CommandLine::from_argv(&self.config.sudo_prime)
            .unwrap_or_else(|| CommandLine::new("sudo").args(["-S", "-v"]));
        Session::new(prime)
    }

    fn helper_command(&self, args: &[String]) -> CommandLine {
        CommandLine::new(self.command.as_str()).args(args.iter().cloned())
    }

    // ===== 查询 =====

    /// 构造搜索命令；空查询或以 `-` 开头的词返回 None
    pub fn search_command(&self, query: &str) -> Option<CommandLine> {
        let terms: Vec<&str> = query.split_whitespace().collect();
        if terms.is_empty() {
            return None;
        }
        if let Some(term) = terms.iter().find(|t| t.starts_with('-')) {
            log::warn!("拒绝以 '-' 开头的搜索词: {}", term);
            return None;
        }
        Some(self.helper_command(&self.config.search_args).args(terms))
    }

    /// 搜索远程仓库与 AUR，并用本地包数据库校正已安装状态
    pub fn search(&self, query: &str) -> Vec<PackageRecord> {
        self.search_with(query, &self.database)
    }

    pub fn search_with<C>(&self, query: &str, check: &C) -> Vec<PackageRecord>
    where
        C: InstalledCheck + ?Sized,
    {
        let Some(command) = self.search_command(query) else {
            return Vec::new();
        };
        records_from_output(&run_capturing(&command), check)
    }

    /// 在阻塞线程池中执行搜索，调用方的事件循环不会被阻塞
    pub async fn search_async(&self, query: &str) -> Vec<PackageRecord> {
        let pm = self.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || pm.search(&query))
            .await
            .unwrap_or_else(|e| {
                log::warn!("搜索任务异常退出: {}", e);
                Vec::new()
            })
    }

    // ===== 安装 / 卸载 / 清理 =====

    pub fn install_command(&self, package: &str) -> Result<CommandLine> {
        validate_package_name(package)?;
        Ok(self.helper_command(&self.config.install_args).arg(package))
    }

    /// 卸载命令，同时移除不再需要的依赖
    pub fn remove_command(&self, package: &str) -> Result<CommandLine> {
        validate_package_name(package)?;
        Ok(self.helper_command(&self.config.remove_args).arg(package))
    }

    pub fn clean_command(&self) -> CommandLine {
        self.helper_command(&self.config.clean_args)
    }

    /// 安装单个包；`output_tx` 为 None 时只关心退出状态
    pub fn install(
        &self,
        session: &Session,
        package: &str,
        output_tx: Option<&mpsc::UnboundedSender<String>>,
    ) -> Result<CommandOutput> {
        let command = self.install_command(package)?;
        run_privileged(session, &command, output_tx)
    }

    pub fn remove(
        &self,
        session: &Session,
        package: &str,
        output_tx: Option<&mpsc::UnboundedSender<String>>,
    ) -> Result<CommandOutput> {
        let command = self.remove_command(package)?;
        run_privileged(session, &command, output_tx)
    }

    /// 清理孤立包 (yay -Yc)
    pub fn clean_orphans(
        &self,
        session: &Session,
        output_tx: Option<&mpsc::UnboundedSender<String>>,
    ) -> Result<CommandOutput> {
        run_privileged(session, &self.clean_command(), output_tx)
    }
}

/// 清理转义序列 -> 解析 -> 校正已安装状态
fn records_from_output<C>(raw: &str, check: &C) -> Vec<PackageRecord>
where
    C: InstalledCheck + ?Sized,
{
    let mut records = parse_search_output(&clean_terminal_output(raw));
    resolve_installed(&mut records, check);
    records
}

/// 先预认证 sudo，再以普通用户身份运行 yay（yay 内部的 sudo 会复用凭证）
fn run_privileged(
    session: &Session,
    command: &CommandLine,
    output_tx: Option<&mpsc::UnboundedSender<String>>,
) -> Result<CommandOutput> {
    session.authenticate()?;
    Ok(match output_tx {
        Some(tx) => run_streaming(command, tx),
        None => CommandOutput {
            stdout: String::new(),
            success: run_for_status(command),
        },
    })
}

/// 包名只允许 pacman 接受的字符，且不能以 `-` 或 `.` 开头
pub fn validate_package_name(name: &str) -> Result<()> {
    let valid_char = |c: char| c.is_ascii_alphanumeric() || "@._+-".contains(c);
    let valid = !name.is_empty()
        && !name.starts_with('-')
        && !name.starts_with('.')
        && name.chars().all(valid_char);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidPackageName(name.to_string()))
    }
}
