//! 版本控制协作方
//! Version-control collaborator
//!
//! 挖矿循环与验证器只依赖这里定义的几个操作。
//! 实现可以是本地 git 仓库 (`git`)，也可以是内存中的历史 (`memory`)。

pub mod git;
pub mod memory;

use crate::error::Error;
use crate::types::{CommitId, CommitTimestamps};
use std::path::Path;

/// 版本控制协作方特征。
pub trait Vcs {
    /// 当前 HEAD 提交的标识；还没有任何提交时返回 `None`。
    fn head(&self) -> Result<Option<CommitId>, Error>;

    /// HEAD 提交的作者与提交者时间戳。
    fn head_timestamps(&self) -> Result<CommitTimestamps, Error>;

    /// 原地修改 HEAD 提交：保留提交信息，使用给定的时间戳，并包含已暂存的改动。
    fn amend_head(&mut self, timestamps: &CommitTimestamps) -> Result<(), Error>;

    /// 全部历史的提交标识，最新的在前。
    fn history(&self) -> Result<Vec<CommitId>, Error>;

    /// 暂存给定文件 (相对仓库根目录) 的当前内容。
    fn stage(&mut self, path: &Path) -> Result<(), Error>;
}

pub use git::GitCli;
pub use memory::MemoryRepo;
