//! 类型定义模块
//! Types definition module
//!
//! 提交标识、难度、时间戳以及一次挖矿会话和一次验证的结果。

use crate::core::{leading_zero_chars, meets_difficulty};
use crate::error::VerifyError;
use std::fmt;
use std::time::Duration;

/// 难度：要求的前导 `'0'` 字符个数 (`k`)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Difficulty(pub u32);

impl Difficulty {
    pub const DEFAULT: Difficulty = Difficulty(3);

    /// 难度谓词。
    #[inline]
    pub fn accepts(self, identity: &str) -> bool {
        meets_difficulty(identity, self.0)
    }

    /// 期望的尝试次数 `16^k`，溢出时饱和。
    pub fn expected_attempts(self) -> u64 {
        16u64.checked_pow(self.0).unwrap_or(u64::MAX)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 提交标识 (哈希字符串)。对本工具来说是不透明的值。
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn leading_zeros(&self) -> usize {
        leading_zero_chars(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 作者与提交者时间戳，使用 git 的 raw 格式 (`<unix 秒> <时区偏移>`)。
///
/// 在第一次 amend 之前读取一次，之后每次 amend 都复用，
/// 这样历史记录反映的是原始提交时间而不是挖矿时间。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommitTimestamps {
    pub author: String,
    pub committer: String,
}

/// 一次挖矿会话的统计信息，只在报告时使用，不持久化。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MiningReport {
    /// 被接受的提交标识。
    pub commit: CommitId,
    /// 写入被接受提交中的 nonce 值。
    pub nonce: u64,
    /// 本次会话的尝试次数。
    pub attempts: u64,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// 挖矿调用的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MineOutcome {
    Mined(MiningReport),
    /// 重入保护已被持有：没有做任何事情，也不算失败。
    Skipped,
}

/// 验证结果。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum VerifyOutcome {
    Passed {
        checked: usize,
    },
    Failed {
        /// 失败提交在历史中的位置 (0 表示最新)。
        index: usize,
        commit: CommitId,
        leading_zeros: usize,
        required: u32,
    },
}

impl VerifyOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, VerifyOutcome::Passed { .. })
    }

    /// 转换为 `Result`，方便调用者用 `?` 传播验证失败。
    pub fn into_result(self) -> Result<usize, VerifyError> {
        match self {
            VerifyOutcome::Passed { checked } => Ok(checked),
            VerifyOutcome::Failed {
                index,
                commit,
                leading_zeros,
                required,
            } => Err(VerifyError::InsufficientDifficulty {
                commit,
                index,
                leading_zeros,
                required,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_difficulty_is_three() {
        assert_eq!(Difficulty::default(), Difficulty(3));
        assert_eq!(Difficulty::default().expected_attempts(), 4096);
    }

    #[test]
    fn expected_attempts_saturates() {
        assert_eq!(Difficulty(0).expected_attempts(), 1);
        assert_eq!(Difficulty(40).expected_attempts(), u64::MAX);
    }

    #[test]
    fn failed_outcome_converts_to_verify_error() {
        let outcome = VerifyOutcome::Failed {
            index: 2,
            commit: CommitId::from("abc12300"),
            leading_zeros: 0,
            required: 3,
        };
        assert!(!outcome.is_pass());
        let err = outcome.into_result().expect_err("failed outcome must be an error");
        assert!(matches!(
            err,
            VerifyError::InsufficientDifficulty { index: 2, .. }
        ));
        assert!(err.to_string().contains("abc12300"));
    }

    #[test]
    fn report_serializes_elapsed_as_seconds() {
        let report = MiningReport {
            commit: CommitId::from("000abc"),
            nonce: 7,
            attempts: 7,
            elapsed: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&report).expect("serialize report");
        assert_eq!(json["commit"], "000abc");
        assert_eq!(json["elapsed"], 1.5);
    }
}
