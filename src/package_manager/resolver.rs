//! 已安装状态校正：以包数据库的结果覆盖 -Ss 输出里的 [installed] 标记

use super::streaming::run_silently;
use super::types::{CommandLine, PackageRecord};

/// 判断单个包是否已安装
pub trait InstalledCheck {
    fn is_installed(&self, name: &str) -> bool;
}

impl<F> InstalledCheck for F
where
    F: Fn(&str) -> bool,
{
    fn is_installed(&self, name: &str) -> bool {
        self(name)
    }
}

/// 通过 `pacman -Qi <name>` 查询本地包数据库
#[derive(Debug, Clone)]
pub struct PackageDatabase {
    query_tool: String,
}

impl PackageDatabase {
    pub fn new(query_tool: impl Into<String>) -> Self {
        Self {
            query_tool: query_tool.into(),
        }
    }

    fn query_command(&self, name: &str) -> CommandLine {
        CommandLine::new(self.query_tool.as_str()).args(["-Qi", name])
    }
}

impl Default for PackageDatabase {
    fn default() -> Self {
        Self::new("pacman")
    }
}

impl InstalledCheck for PackageDatabase {
    fn is_installed(&self, name: &str) -> bool {
        run_silently(&self.query_command(name))
    }
}

/// 逐条覆盖 `installed`，只按包名查询，不区分仓库
pub fn resolve_installed<C>(records: &mut [PackageRecord], check: &C)
where
    C: InstalledCheck + ?Sized,
{
    for record in records.iter_mut() {
        record.installed = check.is_installed(&record.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn record(repo: &str, name: &str, installed: bool) -> PackageRecord {
        PackageRecord {
            repository: repo.to_string(),
            name: name.to_string(),
            version: "1.0-1".to_string(),
            description: String::new(),
            installed,
        }
    }

    #[test]
    fn test_resolver_overrides_heuristic_both_ways() {
        let mut records = vec![record("extra", "marked", true), record("aur", "unmarked", false)];
        resolve_installed(&mut records, &|name: &str| name == "unmarked");

        assert!(!records[0].installed);
        assert!(records[1].installed);
    }

    #[test]
    fn test_resolver_preserves_order_and_queries_by_name() {
        let seen = RefCell::new(Vec::new());
        let check = |name: &str| {
            seen.borrow_mut().push(name.to_string());
            true
        };
        let mut records = vec![
            record("extra", "yay", false),
            record("aur", "yay", false),
            record("aur", "paru", false),
        ];
        resolve_installed(&mut records, &check);

        assert_eq!(*seen.borrow(), vec!["yay", "yay", "paru"]);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["yay", "yay", "paru"]);
        assert!(records.iter().all(|r| r.installed));
    }

    #[test]
    fn test_resolver_on_empty_slice() {
        let mut records: Vec<PackageRecord> = Vec::new();
        resolve_installed(&mut records, &|_: &str| -> bool { panic!("should not be called") });
        assert!(records.is_empty());
    }

    #[test]
    fn test_package_database_command() {
        let db = PackageDatabase::default();
        assert_eq!(db.query_command("ripgrep").to_string(), "pacman -Qi ripgrep");
    }

    #[test]
    fn test_package_database_uses_exit_status() {
        // `true` / `false` 忽略参数，只看退出码
        assert!(PackageDatabase::new("true").is_installed("anything"));
        assert!(!PackageDatabase::new("false").is_installed("anything"));
        assert!(!PackageDatabase::new("pkgcenter-test-no-such-binary").is_installed("x"));
    }
}
