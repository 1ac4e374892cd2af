//! PackageManager 相关数据类型定义

use serde::Serialize;
use std::ffi::OsString;
use std::fmt;

/// 待执行的命令（argv 形式，不经过 shell 解释）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// 通过 `sh -c` 执行一整行 shell 命令
    #[cfg(test)]
    pub fn shell(line: impl Into<String>) -> Self {
        Self::new("sh").arg("-c").arg(line)
    }

    /// 由 argv 列表构造，第一个元素为程序名；列表为空时返回 None
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub(crate) fn to_expression(&self) -> duct::Expression {
        duct::cmd(
            OsString::from(&self.program),
            self.args.iter().map(OsString::from),
        )
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// 流式命令的输出结果
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub success: bool,
}

/// 搜索结果条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    pub repository: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub installed: bool,
}

/// 搜索结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub total: usize,
    pub installed: usize,
}

impl SearchSummary {
    pub fn of(records: &[PackageRecord]) -> Self {
        Self {
            total: records.len(),
            installed: records.iter().filter(|r| r.installed).count(),
        }
    }
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Results: {}  | Installed: {} (already on system)",
            self.total, self.installed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, installed: bool) -> PackageRecord {
        PackageRecord {
            repository: "extra".to_string(),
            name: name.to_string(),
            version: "1.0-1".to_string(),
            description: String::new(),
            installed,
        }
    }

    #[test]
    fn test_command_line_display_joins_args() {
        let cmd = CommandLine::new("yay").args(["-Ss", "firefox"]);
        assert_eq!(cmd.to_string(), "yay -Ss firefox");
    }

    #[test]
    fn test_command_line_shell_wraps_in_sh() {
        let cmd = CommandLine::shell("echo hi");
        assert_eq!(cmd.program, "sh");
        assert_eq!(cmd.args, vec!["-c".to_string(), "echo hi".to_string()]);
    }

    #[test]
    fn test_command_line_from_argv() {
        let argv = vec!["sudo".to_string(), "-S".to_string(), "-v".to_string()];
        let cmd = CommandLine::from_argv(&argv).unwrap();
        assert_eq!(cmd.program, "sudo");
        assert_eq!(cmd.args, vec!["-S", "-v"]);
        assert!(CommandLine::from_argv(&[]).is_none());
    }

    #[test]
    fn test_summary_counts_installed() {
        let records = vec![record("a", true), record("b", false), record("c", true)];
        let summary = SearchSummary::of(&records);
        assert_eq!(summary, SearchSummary { total: 3, installed: 2 });
        assert_eq!(
            summary.to_string(),
            "Results: 3  | Installed: 2 (already on system)"
        );
    }

    #[test]
    fn test_record_serializes_field_names() {
        let json = serde_json::to_value(record("ripgrep", true)).unwrap();
        assert_eq!(json["repository"], "extra");
        assert_eq!(json["name"], "ripgrep");
        assert_eq!(json["installed"], true);
    }
}
