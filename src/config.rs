//! 运行配置。
//!
//! 命令行参数 (以及对应的环境变量) 解析后汇总到这里。

use crate::nonce::DEFAULT_NONCE_FILE;
use crate::types::Difficulty;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 仓库 (或其中任意子目录)。
    pub repo: PathBuf,
    pub difficulty: Difficulty,
    /// nonce 文件，相对仓库根目录。
    pub nonce_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("."),
            difficulty: Difficulty::DEFAULT,
            nonce_file: PathBuf::from(DEFAULT_NONCE_FILE),
        }
    }
}
