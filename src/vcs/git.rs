//! 通过 `git` 命令行实现的协作方。

use super::Vcs;
use crate::error::Error;
use crate::guard::MINING_MARKER_ENV;
use crate::types::{CommitId, CommitTimestamps, Difficulty};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// 生成 post-commit 钩子脚本：用绝对路径调用 `exe`，并固定安装时的难度与 nonce 文件。
pub fn post_commit_hook_script(exe: &Path, difficulty: Difficulty, nonce_file: &Path) -> String {
    format!(
        "#!/bin/sh\n# installed by gitpow\nexec {} hook -k {} --nonce-file {}\n",
        shell_quote(&exe.to_string_lossy()),
        difficulty.0,
        shell_quote(&nonce_file.to_string_lossy()),
    )
}

/// 单引号包裹；内部的 `'` 写成 `'\''`。
fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// 在 `root` 目录下执行 `git` 命令的协作方。
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 从 `dir` 向上查找工作树根目录。
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let probe = Self::new(dir.as_ref());
        let top = probe.run(&["rev-parse", "--show-toplevel"])?;
        Ok(Self::new(top))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.root).args(args);
        cmd
    }

    fn output(&self, label: &str, mut cmd: Command) -> Result<Output, Error> {
        debug!(command = label, "running git");
        cmd.output()
            .map_err(|err| Error::vcs(label, format!("cannot spawn git: {err}")))
    }

    /// 执行命令并返回去掉首尾空白的标准输出；非零退出码视为错误。
    fn run(&self, args: &[&str]) -> Result<String, Error> {
        let label = format!("git {}", args.join(" "));
        let out = self.output(&label, self.command(args))?;
        if !out.status.success() {
            return Err(Error::vcs(
                label,
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    /// 钩子目录 (遵守 `core.hooksPath`)。
    pub fn hooks_dir(&self) -> Result<PathBuf, Error> {
        let dir = PathBuf::from(self.run(&["rev-parse", "--git-path", "hooks"])?);
        Ok(if dir.is_absolute() {
            dir
        } else {
            self.root.join(dir)
        })
    }

    /// 安装 post-commit 钩子。已有钩子且未指定 `force` 时拒绝覆盖。
    pub fn install_post_commit_hook(&self, script: &str, force: bool) -> Result<PathBuf, Error> {
        let dir = self.hooks_dir()?;
        fs::create_dir_all(&dir)?;
        let path = dir.join("post-commit");
        if path.exists() && !force {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists (use --force)", path.display()),
            )));
        }
        fs::write(&path, script)?;
        make_executable(&path)?;
        Ok(path)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl Vcs for GitCli {
    fn head(&self) -> Result<Option<CommitId>, Error> {
        let label = "git rev-parse --verify --quiet HEAD^{commit}";
        let out = self.output(
            label,
            self.command(["rev-parse", "--verify", "--quiet", "HEAD^{commit}"]),
        )?;
        if out.status.success() {
            let id = String::from_utf8_lossy(&out.stdout).trim().to_string();
            return Ok(Some(CommitId::new(id)));
        }
        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        // --quiet 下未出生的分支不输出任何错误信息
        if stderr.is_empty() {
            Ok(None)
        } else {
            Err(Error::vcs(label, stderr))
        }
    }

    fn head_timestamps(&self) -> Result<CommitTimestamps, Error> {
        let out = self.run(&["log", "-1", "--date=raw", "--format=%ad%n%cd", "HEAD"])?;
        let mut lines = out.lines();
        match (lines.next(), lines.next()) {
            (Some(author), Some(committer)) => Ok(CommitTimestamps {
                author: author.trim().to_string(),
                committer: committer.trim().to_string(),
            }),
            _ => Err(Error::vcs("git log -1", format!("unexpected output: {out:?}"))),
        }
    }

    fn amend_head(&mut self, timestamps: &CommitTimestamps) -> Result<(), Error> {
        // 作者时间走 --date，提交者时间只能通过环境变量传入
        let date = format!("--date={}", timestamps.author);
        // --no-verify 跳过 pre-commit/commit-msg 钩子，否则每次尝试都会跑一遍；
        // post-commit 钩子不受影响，由下面的标记处理
        let args = [
            "commit",
            "--amend",
            "--no-edit",
            "--no-verify",
            "--quiet",
            date.as_str(),
        ];
        let label = format!("git {}", args.join(" "));
        let mut cmd = self.command(args);
        // 标记只设置在子进程上，不修改本进程的环境
        cmd.env("GIT_COMMITTER_DATE", &timestamps.committer)
            .env(MINING_MARKER_ENV, "1");
        let out = self.output(&label, cmd)?;
        if !out.status.success() {
            let mut msg = String::from_utf8_lossy(&out.stderr).trim().to_string();
            // "nothing to commit" 之类的信息 git 写在 stdout 上
            if msg.is_empty() {
                msg = String::from_utf8_lossy(&out.stdout).trim().to_string();
            }
            return Err(Error::vcs(label, msg));
        }
        Ok(())
    }

    fn history(&self) -> Result<Vec<CommitId>, Error> {
        if self.head()?.is_none() {
            return Ok(Vec::new());
        }
        // rev-list 默认按时间倒序，最新的在前
        let out = self.run(&["rev-list", "HEAD"])?;
        Ok(out.lines().map(CommitId::from).collect())
    }

    fn stage(&mut self, path: &Path) -> Result<(), Error> {
        let path = path.to_string_lossy();
        self.run(&["add", "--", path.as_ref()])?;
        Ok(())
    }
}
