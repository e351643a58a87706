//! 报告模块
//! Reporting module
//!
//! 挖矿期间输出单行、原地覆盖的进度；结束时输出三行摘要。
//! 纯观察性质：写入失败被忽略，不影响控制流。

use crate::types::{CommitId, MiningReport};
use std::io::{self, Write};

/// 进度与摘要的接收者。
pub trait Reporter {
    /// 每次尝试之后调用。
    fn attempt(&mut self, commit: &CommitId, attempts: u64);

    /// 会话成功结束时调用。
    fn finished(&mut self, report: &MiningReport);
}

/// 丢弃所有输出。
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn attempt(&mut self, _commit: &CommitId, _attempts: u64) {}

    fn finished(&mut self, _report: &MiningReport) {}
}

/// 写到终端 (或任意 `Write`) 的报告器。
#[derive(Debug)]
pub struct TerminalReporter<W: Write> {
    out: W,
    // 是否有一行进度尚未换行
    dirty: bool,
}

impl TerminalReporter<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, dirty: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TerminalReporter<W> {
    fn attempt(&mut self, commit: &CommitId, attempts: u64) {
        let _ = write!(self.out, "\r\x1b[2K{commit} attempt {attempts}");
        let _ = self.out.flush();
        self.dirty = true;
    }

    fn finished(&mut self, report: &MiningReport) {
        if self.dirty {
            let _ = writeln!(self.out);
            self.dirty = false;
        }
        let _ = writeln!(self.out, "commit: {}", report.commit);
        let _ = writeln!(self.out, "elapsed: {:.3}s", report.elapsed.as_secs_f64());
        let _ = writeln!(self.out, "attempts: {}", report.attempts);
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn progress_overwrites_and_summary_has_three_lines() {
        let mut reporter = TerminalReporter::new(Vec::new());
        reporter.attempt(&CommitId::from("1111"), 1);
        reporter.attempt(&CommitId::from("0000"), 2);
        reporter.finished(&MiningReport {
            commit: CommitId::from("0000"),
            nonce: 2,
            attempts: 2,
            elapsed: Duration::from_millis(250),
        });
        let text = String::from_utf8(reporter.into_inner()).expect("utf8");

        assert_eq!(text.matches('\r').count(), 2);
        let summary: Vec<&str> = text.rsplit('\n').skip(1).take(3).collect();
        assert_eq!(
            summary,
            vec!["attempts: 2", "elapsed: 0.250s", "commit: 0000"]
        );
    }
}
