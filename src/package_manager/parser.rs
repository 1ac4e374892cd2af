//! 输出解析函数

use super::types::PackageRecord;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// 删除字节流中的终端控制序列（CSI 颜色/光标序列与 OSC 超链接/标题序列）
///
/// - `ESC [` 开头：一直删到 `@`..=`~` 范围内的结束字节（含）
/// - `ESC ]` 开头：删到 BEL 或 `ESC \`（含），以先出现者为准
/// - 其他情况只删掉 ESC 本身
///
/// 序列没有结束字节时，从 ESC 开始的剩余部分全部丢弃。
pub fn strip_escape_sequences(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if input[i] != ESC {
            out.push(input[i]);
            i += 1;
            continue;
        }

        i = match input.get(i + 1) {
            Some(b'[') => skip_csi(input, i + 2),
            Some(b']') => skip_osc(input, i + 2),
            // 孤立的 ESC
            _ => i + 1,
        };
    }

    out
}

/// 返回 CSI 序列之后第一个字节的位置
fn skip_csi(input: &[u8], start: usize) -> usize {
    input[start.min(input.len())..]
        .iter()
        .position(|b| (b'@'..=b'~').contains(b))
        .map(|pos| start + pos + 1)
        .unwrap_or(input.len())
}

/// 返回 OSC 序列之后第一个字节的位置
fn skip_osc(input: &[u8], start: usize) -> usize {
    let mut j = start;
    while j < input.len() {
        match input[j] {
            BEL => return j + 1,
            ESC if input.get(j + 1) == Some(&b'\\') => return j + 2,
            _ => j += 1,
        }
    }
    input.len()
}

/// 清理终端输出中的转义序列
///
/// 所有结束字节都是 ASCII，合法 UTF-8 输入清理后仍是合法 UTF-8。
pub fn clean_terminal_output(input: &str) -> String {
    let cleaned = strip_escape_sequences(input.as_bytes());
    match String::from_utf8(cleaned) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

enum ParseState {
    AwaitingHeader,
    AwaitingDescription(PackageRecord),
}

/// 解析 yay / paru -Ss 的搜索输出（需先清理转义序列）
///
/// 格式：
/// ```text
/// extra/ripgrep 14.1.0-1 (1.6 MiB 4.6 MiB) [installed]
///     A search tool that combines the usability of ag with the raw speed of grep
/// ```
/// 没有描述行的条目会被丢弃。
/// 行尾的 `\r` 会被去掉，但只含 `\r` 的行不算空行，按无法解析的标题处理。
pub fn parse_search_output(output: &str) -> Vec<PackageRecord> {
    let mut results = Vec::new();
    let mut state = ParseState::AwaitingHeader;

    for raw in output.split('\n') {
        if raw.is_empty() {
            state = ParseState::AwaitingHeader;
            continue;
        }
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if line.starts_with(' ') || line.starts_with('\t') {
            if let ParseState::AwaitingDescription(mut pending) =
                std::mem::replace(&mut state, ParseState::AwaitingHeader)
            {
                let trimmed = line.trim_start_matches([' ', '\t']);
                pending.description = if trimmed.is_empty() {
                    line.to_string()
                } else {
                    trimmed.to_string()
                };
                results.push(pending);
            }
            continue;
        }

        match parse_header(line) {
            Some(record) => state = ParseState::AwaitingDescription(record),
            None => log::trace!("跳过无法解析的行: {:?}", line),
        }
    }

    results
}

/// 解析标题行 "repo/name version [installed]"，描述留空
fn parse_header(line: &str) -> Option<PackageRecord> {
    let (repo_name, rest) = next_token(line)?;
    let (version, rest) = next_token(rest)?;
    let (repository, name) = repo_name.split_once('/')?;
    if repository.is_empty() || name.is_empty() {
        return None;
    }

    let installed = rest.contains("[installed]") || rest.contains("(installed)");

    Some(PackageRecord {
        repository: repository.to_string(),
        name: name.to_string(),
        version: version.to_string(),
        description: String::new(),
        installed,
    })
}

/// 取出下一个以空白分隔的 token，返回 (token, 剩余部分)
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some(s.split_at(end))
}
