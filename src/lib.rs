//! Git 提交工作量证明库
//! Proof-of-work for git commits.
//!
//! 挖矿：不断修改 nonce 文件并原地 amend HEAD 提交，直到提交哈希以 `k` 个 `'0'` 开头。
//! 验证：检查历史中每个提交是否满足同样的难度。

// 声明子模块
pub mod cli; // 命令行入口
pub mod config; // 运行配置
pub mod core; // 难度谓词
pub mod engine; // 挖矿循环
pub mod error; // 错误类型定义
pub mod guard; // 重入保护
pub mod nonce; // nonce 存储
pub mod report; // 进度与摘要输出
pub mod types; // 数据结构定义
pub mod vcs; // 版本控制协作方
pub mod verify; // 历史验证

pub use crate::config::Config;
pub use crate::engine::{Miner, MinerBuilder};
pub use crate::error::{Error, VerifyError};
pub use crate::guard::ReentrancyGuard;
pub use crate::nonce::{FileNonceStore, NonceStore};
pub use crate::report::{Reporter, SilentReporter, TerminalReporter};
pub use crate::types::{
    CommitId, CommitTimestamps, Difficulty, MineOutcome, MiningReport, VerifyOutcome,
};
pub use crate::vcs::{GitCli, MemoryRepo, Vcs};
pub use crate::verify::Verifier;
