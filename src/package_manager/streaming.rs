//! 流式命令执行（search / install / remove / clean）
//!
//! 所有函数在这一层都不返回错误：启动失败视为空输出 / 失败状态，只记录日志。

use super::parser::strip_escape_sequences;
use super::types::{CommandLine, CommandOutput};
use std::io::{BufRead, BufReader};
use std::os::unix::process::CommandExt;
use tokio::sync::mpsc;

/// 构造 duct 表达式；父进程死亡时子进程收到 SIGTERM
fn expression(command: &CommandLine) -> duct::Expression {
    command.to_expression().before_spawn(|cmd| {
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }
        Ok(())
    })
}

/// 逐行读取子进程 stdout 直到管道关闭，每读到一行回调一次
///
/// 返回退出码是否为 0；无法启动时返回 None。
fn drain_lines<F>(command: &CommandLine, mut on_line: F) -> Option<bool>
where
    F: FnMut(&[u8]),
{
    log::debug!("执行命令: {}", command);

    let handle = match expression(command).unchecked().reader() {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!("无法启动 {}: {}", command, e);
            return None;
        }
    };

    let mut reader = BufReader::new(handle);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => on_line(&line),
            Err(e) => {
                log::warn!("读取 {} 的输出失败: {}", command, e);
                break;
            }
        }
    }

    let success = match reader.get_ref().try_wait() {
        Ok(Some(output)) => {
            log::debug!("{} 退出: {:?}", command, output.status);
            output.status.success()
        }
        Ok(None) => false,
        Err(e) => {
            log::warn!("等待 {} 退出失败: {}", command, e);
            false
        }
    };
    Some(success)
}

/// 执行命令并返回完整 stdout；无法启动时返回空字符串
pub fn run_capturing(command: &CommandLine) -> String {
    let mut collected = Vec::new();
    drain_lines(command, |line| collected.extend_from_slice(line));
    String::from_utf8_lossy(&collected).into_owned()
}

/// 执行命令，丢弃输出，仅当退出码为 0 时返回 true
pub fn run_for_status(command: &CommandLine) -> bool {
    drain_lines(command, |_| {}).unwrap_or(false)
}

/// 与 [`run_for_status`] 相同，但 stdout / stderr 都重定向到 /dev/null
pub fn run_silently(command: &CommandLine) -> bool {
    log::debug!("执行命令: {}", command);
    match expression(command)
        .stdout_null()
        .stderr_null()
        .unchecked()
        .run()
    {
        Ok(output) => output.status.success(),
        Err(e) => {
            log::warn!("无法启动 {}: {}", command, e);
            false
        }
    }
}

/// 把密码加换行写入子进程 stdin 后关闭，返回退出码是否为 0
///
/// 只用于 `sudo -S -v` 预认证，让后续 yay 内部调用的 sudo 复用凭证。
/// 密码为空时不启动任何进程，直接返回 false。
pub fn run_sudo_primed(password: &str, command: &CommandLine) -> bool {
    if password.is_empty() {
        return false;
    }

    let mut input = Vec::with_capacity(password.len() + 1);
    input.extend_from_slice(password.as_bytes());
    input.push(b'\n');

    log::debug!("执行预认证命令: {}", command);
    match expression(command).stdin_bytes(input).unchecked().run() {
        Ok(output) => output.status.success(),
        Err(e) => {
            log::warn!("无法启动 {}: {}", command, e);
            false
        }
    }
}

/// 执行命令并把清理后的每一行发送到 channel
///
/// `\r` 分隔的进度行同样会发送，但只有最后一段追加到收集的 stdout。
pub fn run_streaming(
    command: &CommandLine,
    output_tx: &mpsc::UnboundedSender<String>,
) -> CommandOutput {
    let mut stdout = String::new();

    let success = drain_lines(command, |line| {
        let cleaned = strip_escape_sequences(line);
        let text = String::from_utf8_lossy(&cleaned);
        let terminated = text.ends_with('\n');
        let text = text.trim_end_matches('\n');

        let mut last = "";
        for segment in text.split('\r') {
            if !segment.trim().is_empty() {
                let _ = output_tx.send(segment.to_string());
                last = segment;
            }
        }
        stdout.push_str(last);
        if terminated {
            stdout.push('\n');
        }
    })
    .unwrap_or(false);

    CommandOutput { stdout, success }
}
