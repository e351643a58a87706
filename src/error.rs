//! 错误处理模块
//! Error handling module
//!
//! 区分两类失败：操作错误 (`Error`，中止当前调用) 与验证失败 (`VerifyError`，
//! 以非零退出码传给调用者而不是以异常形式抛出)。

use crate::types::CommitId;
use thiserror::Error;

/// 验证失败。
/// A commit in the history does not meet the difficulty predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// 第 `index` 个提交 (从最新开始计数) 的前导零不足。
    #[error("commit {commit} (#{index}) has {leading_zeros} leading zeros, {required} required")]
    InsufficientDifficulty {
        commit: CommitId,
        index: usize,
        leading_zeros: usize,
        required: u32,
    },
}

/// 库的一般性错误，对当前调用都是致命的。
/// Operational errors; all of them are fatal to the current invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// 无法读写 nonce 文件 (或其他本地文件)。
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// 版本控制协作方 (git) 的操作失败。
    #[error("`{command}` failed: {stderr}")]
    Vcs { command: String, stderr: String },

    /// 没有可以修改 (amend) 的 HEAD 提交。
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// 配置参数无效。
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// 达到了测试用的最大尝试次数上限。
    #[error("gave up after {attempts} attempts")]
    AttemptsExhausted { attempts: u64 },
}

impl Error {
    pub(crate) fn vcs(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Error::Vcs {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}
