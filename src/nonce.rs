//! Nonce 存储模块
//! Nonce store module
//!
//! nonce 是工作树中一个被跟踪文件的唯一内容：一个非负整数 (允许结尾换行)。
//! 本工具从不重置它；只有外部删除文件才会让它回到 0。

use crate::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 默认的 nonce 文件路径 (相对仓库根目录)。
pub const DEFAULT_NONCE_FILE: &str = ".gitpow-nonce";

/// Nonce 存储特征。
pub trait NonceStore {
    /// 读取当前值；记录不存在时创建它并返回 0。
    fn read(&mut self) -> Result<u64, Error>;

    /// 用 `value` 替换记录内容。
    fn write(&mut self, value: u64) -> Result<(), Error>;

    /// 需要暂存 (stage) 的路径，相对仓库根目录。
    fn tracked_path(&self) -> &Path;
}

/// 基于文件的实现。
#[derive(Debug, Clone)]
pub struct FileNonceStore {
    root: PathBuf,
    relative: PathBuf,
}

impl FileNonceStore {
    pub fn new(root: impl Into<PathBuf>, relative: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            relative: relative.into(),
        }
    }

    /// 文件的完整路径。
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.relative)
    }
}

impl NonceStore for FileNonceStore {
    fn read(&mut self) -> Result<u64, Error> {
        let path = self.path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            // 第一次运行：创建值为 0 的记录
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.write(0)?;
                return Ok(0);
            }
            Err(err) => return Err(err.into()),
        };
        // 允许结尾换行 (包括 \r\n)，其他内容一律视为损坏
        text.trim().parse::<u64>().map_err(|err| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{}: not a nonce ({err})", path.display()),
            ))
        })
    }

    fn write(&mut self, value: u64) -> Result<(), Error> {
        // 整体覆盖写入；暂存由挖矿循环通过协作方完成
        fs::write(self.path(), format!("{value}\n"))?;
        Ok(())
    }

    fn tracked_path(&self) -> &Path {
        &self.relative
    }
}
