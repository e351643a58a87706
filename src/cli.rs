//! 命令行界面
//! Command-line interface
//!
//! `mine` 和 `verify` 两个独立入口，各自返回进程级的成功/失败信号，
//! 便于在自动化流程中把关。`hook` 是 post-commit 钩子调用的入口。

use crate::config::Config;
use crate::engine::MinerBuilder;
use crate::guard::{ReentrancyGuard, MINING_MARKER_ENV};
use crate::nonce::{FileNonceStore, DEFAULT_NONCE_FILE};
use crate::report::{Reporter, SilentReporter, TerminalReporter};
use crate::types::{Difficulty, MineOutcome};
use crate::vcs::git::post_commit_hook_script;
use crate::vcs::GitCli;
use crate::verify::Verifier;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gitpow", version, about = "Proof-of-work for git commits", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Repository to operate on (any directory inside the work tree).
    #[arg(long, short = 'C', global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Required number of leading '0' characters in commit hashes.
    #[arg(long, short = 'k', global = true, env = "GITPOW_DIFFICULTY", default_value_t = Difficulty::DEFAULT.0)]
    pub difficulty: u32,

    /// Nonce file, relative to the repository root.
    #[arg(long, global = true, env = "GITPOW_NONCE_FILE", default_value = DEFAULT_NONCE_FILE)]
    pub nonce_file: PathBuf,
}

impl GlobalArgs {
    pub fn config(&self) -> Config {
        Config {
            repo: self.repo.clone(),
            difficulty: Difficulty(self.difficulty),
            nonce_file: self.nonce_file.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Amend HEAD until its hash meets the difficulty (skipped inside gitpow's own amend).
    Mine(MineArgs),
    /// Check that every commit in history meets the difficulty.
    Verify(VerifyArgs),
    /// Post-commit hook entry point; does nothing when triggered by gitpow itself.
    Hook(HookArgs),
    /// Install a post-commit hook that runs `gitpow hook`.
    InstallHook(InstallHookArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct MineArgs {
    /// Give up after this many attempts (for tests; unbounded by default).
    #[arg(long)]
    pub max_attempts: Option<u64>,

    /// Print the final report as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Suppress progress output.
    #[arg(long, short)]
    pub quiet: bool,

    /// Set by gitpow on its own `git commit --amend` children.
    #[arg(long, env = MINING_MARKER_ENV, hide = true)]
    pub marker: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct VerifyArgs {
    /// Print the outcome as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct HookArgs {
    #[command(flatten)]
    pub mine: MineArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InstallHookArgs {
    /// Overwrite an existing post-commit hook.
    #[arg(long)]
    pub force: bool,
}

/// 执行解析后的命令。
pub fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.global.config();
    match cli.command {
        // 两个入口都认 git 子进程上的标记，钩子里误用 `mine` 也不会嵌套挖矿
        Command::Mine(args) | Command::Hook(HookArgs { mine: args }) => {
            let guard = ReentrancyGuard::from_marker(args.marker.as_deref());
            mine(&config, &args, &guard)
        }
        Command::Verify(args) => verify(&config, &args),
        Command::InstallHook(args) => install_hook(&config, &args),
    }
}

fn open_repo(config: &Config) -> Result<GitCli> {
    GitCli::discover(&config.repo)
        .with_context(|| format!("opening repository at {}", config.repo.display()))
}

pub fn mine(config: &Config, args: &MineArgs, guard: &ReentrancyGuard) -> Result<ExitCode> {
    let mut builder = MinerBuilder::default().difficulty(config.difficulty);
    if let Some(max) = args.max_attempts {
        builder = builder.max_attempts(max);
    }
    let miner = builder.build_validated()?;

    // 保护被持有时不需要打开仓库
    if guard.is_held() {
        info!("triggered by our own amend, nothing to do");
        return Ok(ExitCode::SUCCESS);
    }

    let mut repo = open_repo(config)?;
    let mut store = FileNonceStore::new(repo.root(), &config.nonce_file);
    let mut reporter: Box<dyn Reporter> = if args.quiet || args.json {
        Box::new(SilentReporter)
    } else {
        Box::new(TerminalReporter::stderr())
    };

    let outcome = miner
        .mine(&mut repo, &mut store, guard, reporter.as_mut())
        .context("mining failed")?;

    if let (true, MineOutcome::Mined(report)) = (args.json, &outcome) {
        println!("{}", serde_json::to_string(report)?);
    }
    Ok(ExitCode::SUCCESS)
}

pub fn verify(config: &Config, args: &VerifyArgs) -> Result<ExitCode> {
    let repo = open_repo(config)?;
    let outcome = Verifier::new(config.difficulty)
        .verify_history(&repo)
        .context("listing history failed")?;

    if args.json {
        println!("{}", serde_json::to_string(&outcome)?);
    }
    let passed = outcome.is_pass();
    match outcome.into_result() {
        Ok(checked) => {
            if !args.json {
                println!("ok: {checked} commits meet difficulty {}", config.difficulty);
            }
        }
        Err(err) => {
            if !args.json {
                println!("FAILED: {err}");
            }
        }
    }
    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn install_hook(config: &Config, args: &InstallHookArgs) -> Result<ExitCode> {
    let repo = open_repo(config)?;
    // 钩子里写死当前可执行文件的绝对路径和安装时的配置，不依赖 PATH 和提交时的环境变量
    let exe = std::env::current_exe().context("locating the gitpow executable")?;
    let script = post_commit_hook_script(&exe, config.difficulty, &config.nonce_file);
    let path = repo
        .install_post_commit_hook(&script, args.force)
        .context("installing post-commit hook")?;
    println!("installed {}", path.display());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mine_with_defaults() {
        let cli = Cli::try_parse_from(["gitpow", "mine"]).expect("parse");
        assert!(matches!(cli.command, Command::Mine(_)));
        let config = cli.global.config();
        assert_eq!(config.nonce_file, PathBuf::from(DEFAULT_NONCE_FILE));
        assert_eq!(config.repo, PathBuf::from("."));
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["gitpow", "verify", "-k", "5", "--json"]).expect("parse");
        assert_eq!(cli.global.difficulty, 5);
        match cli.command {
            Command::Verify(args) => assert!(args.json),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn hook_accepts_explicit_marker() {
        let cli = Cli::try_parse_from(["gitpow", "hook", "--marker", "1", "--max-attempts", "9"])
            .expect("parse");
        match cli.command {
            Command::Hook(args) => {
                assert_eq!(args.mine.marker.as_deref(), Some("1"));
                assert_eq!(args.mine.max_attempts, Some(9));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn mine_honours_marker_too() {
        let cli = Cli::try_parse_from(["gitpow", "-C", "/nonexistent", "mine", "--marker", "1"])
            .expect("parse");
        let code = run(cli).expect("marker makes mine neutral");
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn held_guard_exits_successfully_without_a_repository() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            repo: dir.path().join("not-a-repo"),
            ..Config::default()
        };
        let code = mine(&config, &MineArgs::default(), &ReentrancyGuard::held()).expect("neutral");
        assert_eq!(code, ExitCode::SUCCESS);
    }
}
