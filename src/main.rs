mod cli;
mod config;
mod error;
mod package_manager;

use anyhow::{bail, Result};
use clap::Parser;
use cli::{Cli, Commands};
use crossterm::style::Stylize;
use dialoguer::{Confirm, Password};
use package_manager::{PackageManager, PackageRecord, SearchSummary, Session};
use tokio::sync::mpsc;

/// 非交互环境下可通过该环境变量提供 sudo 密码
const PASSWORD_ENV: &str = "PKGCENTER_SUDO_PASSWORD";

/// 需要 sudo 的操作
enum Operation {
    Install(String),
    Remove(String),
    CleanOrphans,
}

impl Operation {
    fn confirm_prompt(&self, helper: &str) -> String {
        match self {
            Operation::Install(name) => format!("使用 {} 安装 \"{}\"？", helper, name),
            Operation::Remove(name) => {
                format!("卸载 \"{}\"？同时会移除不再需要的依赖", name)
            }
            Operation::CleanOrphans => "清理孤立包？".to_string(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Operation::Install(_) => "安装",
            Operation::Remove(_) => "卸载",
            Operation::CleanOrphans => "清理",
        }
    }

    fn run(
        &self,
        pm: &PackageManager,
        session: &Session,
        output_tx: &mpsc::UnboundedSender<String>,
    ) -> error::Result<package_manager::CommandOutput> {
        match self {
            Operation::Install(name) => pm.install(session, name, Some(output_tx)),
            Operation::Remove(name) => pm.remove(session, name, Some(output_tx)),
            Operation::CleanOrphans => pm.clean_orphans(session, Some(output_tx)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // 加载配置
    let config = config::Config::load_or_default()?;
    let pm = PackageManager::detect(config)?;

    match cli.command {
        Commands::Search { query, json } => search(&pm, &query.join(" "), json).await,
        Commands::Install { package, yes } => {
            run_operation(pm, Operation::Install(package), yes).await
        }
        Commands::Remove { package, yes } => {
            run_operation(pm, Operation::Remove(package), yes).await
        }
        Commands::Clean { yes } => run_operation(pm, Operation::CleanOrphans, yes).await,
    }
}

async fn search(pm: &PackageManager, query: &str, json: bool) -> Result<()> {
    let records = pm.search_async(query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    for record in &records {
        print_record(record);
    }
    println!();
    let summary = SearchSummary::of(&records).to_string();
    println!("{}", summary.as_str().bold());
    Ok(())
}

fn print_record(record: &PackageRecord) {
    let marker = if record.installed {
        format!(" {}", "[installed]".cyan())
    } else {
        String::new()
    };
    println!(
        "{}/{} {}{}",
        record.repository.as_str().magenta().bold(),
        record.name.as_str().bold(),
        record.version.as_str().green(),
        marker
    );
    println!("    {}", record.description);
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    Ok(Password::new()
        .with_prompt(format!("[sudo] {} 的密码", whoami()))
        .interact()?)
}

fn whoami() -> String {
    std::env::var("USER").unwrap_or_else(|_| "当前用户".to_string())
}

async fn run_operation(pm: PackageManager, operation: Operation, yes: bool) -> Result<()> {
    if !yes
        && !Confirm::new()
            .with_prompt(operation.confirm_prompt(&pm.command))
            .default(false)
            .interact()?
    {
        println!("{} 已取消", "!".yellow());
        return Ok(());
    }

    // 密码只保存在本次会话中
    let session = pm.session().with_password(read_password()?);
    if !session.has_credential() {
        bail!(error::Error::MissingCredential);
    }
    let helper = pm.command.clone();

    let (output_tx, mut output_rx) = mpsc::unbounded_channel();
    let label = operation.label();
    let task = tokio::task::spawn_blocking(move || operation.run(&pm, &session, &output_tx));

    while let Some(line) = output_rx.recv().await {
        println!("{}", line.as_str().dark_grey());
    }

    let output = task.await??;
    if output.success {
        println!("{} {}完成，重新搜索即可看到最新状态", "✓".green(), label);
        Ok(())
    } else {
        log::debug!("{}输出:\n{}", label, output.stdout);
        bail!("{}可能失败，请查看上面的输出或手动运行 {}", label, helper)
    }
}
