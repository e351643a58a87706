//! 挖矿引擎模块
//! Mining engine module
//!
//! 不断递增 nonce、暂存、原地修改 HEAD 提交，直到新的提交标识满足难度。
//! 搜索是无界的：期望尝试次数为 `16^k`，呈几何分布。
//! `max_attempts` 只供测试限制运行时间，生产环境中为 `None`。
//!
//! 每次尝试依赖上一次 amend 的结果，因此循环是严格串行的。
//! 同一仓库上并发运行多个挖矿进程是不安全的。

use crate::error::Error;
use crate::guard::ReentrancyGuard;
use crate::nonce::NonceStore;
use crate::report::Reporter;
use crate::types::{Difficulty, MineOutcome, MiningReport};
use crate::vcs::Vcs;
use derive_builder::Builder;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// 挖矿器。
///
/// ```
/// use gitpow::{Difficulty, MinerBuilder};
///
/// let miner = MinerBuilder::default()
///     .difficulty(Difficulty(2))
///     .build_validated()
///     .expect("valid miner");
/// assert_eq!(miner.difficulty, Difficulty(2));
/// ```
#[derive(Builder, Debug, Clone)]
#[builder(pattern = "owned")]
pub struct Miner {
    /// 目标难度。
    #[builder(default)]
    pub difficulty: Difficulty,

    /// 尝试次数上限。生产环境不设置。
    #[builder(default, setter(strip_option))]
    pub max_attempts: Option<u64>,

    /// 本次会话已完成的尝试次数，可由外部读取。
    #[builder(default)]
    pub progress: Arc<AtomicU64>,
}

impl Miner {
    fn validate(&self) -> Result<(), Error> {
        if self.max_attempts == Some(0) {
            return Err(Error::InvalidConfig("max_attempts must be >= 1".into()));
        }
        Ok(())
    }

    /// 对当前 HEAD 提交挖矿。
    ///
    /// 保护已被持有时立即返回 `MineOutcome::Skipped`，不触碰仓库和 nonce 文件。
    pub fn mine<V, S, R>(
        &self,
        vcs: &mut V,
        store: &mut S,
        guard: &ReentrancyGuard,
        reporter: &mut R,
    ) -> Result<MineOutcome, Error>
    where
        V: Vcs + ?Sized,
        S: NonceStore + ?Sized,
        R: Reporter + ?Sized,
    {
        self.validate()?;

        // token 持有到函数返回，期间任何重入都会得到 Skipped
        let Some(_token) = guard.enter() else {
            info!("mining already in progress, skipping");
            return Ok(MineOutcome::Skipped);
        };

        let head = vcs
            .head()?
            .ok_or_else(|| Error::Precondition("no commit to amend".into()))?;
        // 在第一次 amend 之前读取，之后不再更新
        let timestamps = vcs.head_timestamps()?;
        // 文件不存在时从 0 开始；本工具从不重置
        let mut nonce = store.read()?;

        info!(
            %head,
            difficulty = self.difficulty.0,
            expected = self.difficulty.expected_attempts(),
            start_nonce = nonce,
            "mining started"
        );

        self.progress.store(0, Ordering::SeqCst);
        let started = Instant::now();
        let mut attempts = 0u64;

        loop {
            // 只有测试会设置上限，生产环境的搜索没有上界
            if let Some(max) = self.max_attempts {
                if attempts >= max {
                    return Err(Error::AttemptsExhausted { attempts });
                }
            }

            // 每次只加 1，nonce 在一次会话内单调递增
            nonce = nonce
                .checked_add(1)
                .ok_or_else(|| Error::Precondition("nonce space exhausted".into()))?;
            // 顺序固定：先落盘，再暂存，最后 amend；
            // 新的提交标识必须包含这一次的 nonce
            store.write(nonce)?;
            vcs.stage(store.tracked_path())?;
            // 时间戳复用会话开始时读到的值，历史里保留原始提交时间
            vcs.amend_head(&timestamps)?;
            attempts += 1;
            self.progress.fetch_add(1, Ordering::SeqCst);

            // 旧的 (不满足难度的) 提交已被替换，不会留在历史里
            let commit = vcs
                .head()?
                .ok_or_else(|| Error::Precondition("HEAD vanished after amend".into()))?;
            reporter.attempt(&commit, attempts);
            debug!(%commit, nonce, attempts, "attempt");

            if self.difficulty.accepts(commit.as_str()) {
                let report = MiningReport {
                    commit,
                    nonce,
                    attempts,
                    elapsed: started.elapsed(),
                };
                reporter.finished(&report);
                info!(
                    commit = %report.commit,
                    attempts,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "mining finished"
                );
                return Ok(MineOutcome::Mined(report));
            }
        }
    }
}

impl MinerBuilder {
    /// 构建并验证。
    pub fn build_validated(self) -> Result<Miner, Error> {
        let miner = self
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        miner.validate()?;
        Ok(miner)
    }
}
