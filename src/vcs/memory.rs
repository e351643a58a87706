//! 内存中的协作方。
//!
//! 提交标识是 BLAKE3 十六进制摘要，输入为父提交、提交信息、时间戳和暂存区内容，
//! 因此和 git 一样是提交内容的纯函数。暂存时从工作目录 `root` 读取文件。

use super::Vcs;
use crate::error::Error;
use crate::types::{CommitId, CommitTimestamps};
use blake3::Hasher as Blake3Hasher;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct MemCommit {
    id: CommitId,
    message: String,
    timestamps: CommitTimestamps,
}

/// 内存仓库。
#[derive(Debug, Clone)]
pub struct MemoryRepo {
    root: PathBuf,
    index: BTreeMap<PathBuf, Vec<u8>>,
    // 最早的在前
    commits: Vec<MemCommit>,
}

impl MemoryRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: BTreeMap::new(),
            commits: Vec::new(),
        }
    }

    /// 用当前暂存区内容创建一个新提交。
    pub fn commit(&mut self, message: &str, timestamps: CommitTimestamps) -> CommitId {
        let parent = self.commits.last().map(|c| c.id.clone());
        let id = self.identity(parent.as_ref(), message, &timestamps);
        self.commits.push(MemCommit {
            id: id.clone(),
            message: message.to_string(),
            timestamps,
        });
        id
    }

    /// 提交数量。
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// 暂存区中某个路径的内容。
    pub fn staged(&self, path: &Path) -> Option<&[u8]> {
        self.index.get(path).map(Vec::as_slice)
    }

    fn identity(
        &self,
        parent: Option<&CommitId>,
        message: &str,
        timestamps: &CommitTimestamps,
    ) -> CommitId {
        let mut hasher = Blake3Hasher::new();
        hasher.update(b"gitpow:memory:commit:v1|");
        if let Some(parent) = parent {
            hasher.update(parent.as_str().as_bytes());
        }
        hasher.update(b"|");
        for field in [
            message,
            timestamps.author.as_str(),
            timestamps.committer.as_str(),
        ] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        for (path, content) in &self.index {
            let path = path.to_string_lossy();
            hasher.update(&(path.len() as u64).to_le_bytes());
            hasher.update(path.as_bytes());
            hasher.update(&(content.len() as u64).to_le_bytes());
            hasher.update(content);
        }
        CommitId::new(hasher.finalize().to_hex().to_string())
    }
}

impl Vcs for MemoryRepo {
    fn head(&self) -> Result<Option<CommitId>, Error> {
        Ok(self.commits.last().map(|c| c.id.clone()))
    }

    fn head_timestamps(&self) -> Result<CommitTimestamps, Error> {
        self.commits
            .last()
            .map(|c| c.timestamps.clone())
            .ok_or_else(|| Error::Precondition("no commits yet".into()))
    }

    fn amend_head(&mut self, timestamps: &CommitTimestamps) -> Result<(), Error> {
        let Some(head) = self.commits.pop() else {
            return Err(Error::vcs("amend", "no commit to amend"));
        };
        let parent = self.commits.last().map(|c| c.id.clone());
        let id = self.identity(parent.as_ref(), &head.message, timestamps);
        self.commits.push(MemCommit {
            id,
            message: head.message,
            timestamps: timestamps.clone(),
        });
        Ok(())
    }

    fn history(&self) -> Result<Vec<CommitId>, Error> {
        Ok(self.commits.iter().rev().map(|c| c.id.clone()).collect())
    }

    fn stage(&mut self, path: &Path) -> Result<(), Error> {
        let content = fs::read(self.root.join(path))?;
        self.index.insert(path.to_path_buf(), content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> CommitTimestamps {
        CommitTimestamps {
            author: "1700000000 +0000".into(),
            committer: "1700000000 +0000".into(),
        }
    }

    #[test]
    fn identity_depends_on_staged_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut repo = MemoryRepo::new(dir.path());
        fs::write(dir.path().join("n"), "1\n").expect("write");
        repo.stage(Path::new("n")).expect("stage");
        let first = repo.commit("init", ts());

        fs::write(dir.path().join("n"), "2\n").expect("write");
        repo.stage(Path::new("n")).expect("stage");
        repo.amend_head(&ts()).expect("amend");
        let second = repo.head().expect("head").expect("some head");

        assert_ne!(first, second);
        assert_eq!(repo.len(), 1, "amend rewrites in place");
        assert_eq!(second.as_str().len(), 64);
    }

    #[test]
    fn identical_content_gives_identical_identity() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut a = MemoryRepo::new(dir.path());
        let mut b = MemoryRepo::new(dir.path());
        assert_eq!(a.commit("msg", ts()), b.commit("msg", ts()));
    }

    #[test]
    fn history_is_most_recent_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut repo = MemoryRepo::new(dir.path());
        let c1 = repo.commit("one", ts());
        let c2 = repo.commit("two", ts());
        assert_eq!(repo.history().expect("history"), vec![c2, c1]);
    }

    #[test]
    fn empty_repo_has_no_head_and_cannot_amend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut repo = MemoryRepo::new(dir.path());
        assert!(repo.is_empty());
        assert!(repo.head().expect("head").is_none());
        assert!(repo.history().expect("history").is_empty());
        assert!(matches!(repo.amend_head(&ts()), Err(Error::Vcs { .. })));
    }

    #[test]
    fn staging_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut repo = MemoryRepo::new(dir.path());
        assert!(matches!(
            repo.stage(Path::new("nope")),
            Err(Error::Io(_))
        ));
    }
}
