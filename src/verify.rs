//! 验证模块
//! Verifier module
//!
//! 按顺序 (最新在前) 检查每个提交标识是否满足难度，遇到第一个失败即停止。
//! 只读、幂等，可以安全地并发和重复运行。
//! 空历史视为通过 (空真)。

use crate::error::Error;
use crate::types::{CommitId, Difficulty, VerifyOutcome};
use crate::vcs::Vcs;
use tracing::{info, warn};

/// 历史验证器。
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier {
    difficulty: Difficulty,
}

impl Verifier {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// 验证一组标识。
    pub fn verify<I, C>(&self, ids: I) -> VerifyOutcome
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut checked = 0usize;
        for (index, id) in ids.into_iter().enumerate() {
            let id = id.as_ref();
            if !self.difficulty.accepts(id) {
                let commit = CommitId::new(id);
                warn!(
                    %commit,
                    index,
                    required = self.difficulty.0,
                    "commit does not meet difficulty"
                );
                return VerifyOutcome::Failed {
                    index,
                    leading_zeros: commit.leading_zeros(),
                    commit,
                    required: self.difficulty.0,
                };
            }
            checked += 1;
        }
        info!(checked, difficulty = self.difficulty.0, "history verified");
        VerifyOutcome::Passed { checked }
    }

    /// 列出协作方的全部历史并验证。
    pub fn verify_history<V: Vcs + ?Sized>(&self, vcs: &V) -> Result<VerifyOutcome, Error> {
        let history = vcs.history()?;
        Ok(self.verify(history.iter().map(CommitId::as_str)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::MemoryRepo;

    #[test]
    fn reports_first_failing_identity() {
        let outcome =
            Verifier::new(Difficulty(3)).verify(["0001a2b3", "000fcab1", "abc12300"]);
        assert_eq!(
            outcome,
            VerifyOutcome::Failed {
                index: 2,
                commit: CommitId::from("abc12300"),
                leading_zeros: 0,
                required: 3,
            }
        );
    }

    #[test]
    fn stops_at_first_failure() {
        let outcome = Verifier::new(Difficulty(1)).verify(["0a", "b", "c"]);
        assert!(matches!(outcome, VerifyOutcome::Failed { index: 1, .. }));
    }

    #[test]
    fn all_passing_history() {
        let outcome = Verifier::new(Difficulty(2)).verify(vec!["00a".to_string(), "000".into()]);
        assert_eq!(outcome, VerifyOutcome::Passed { checked: 2 });
    }

    #[test]
    fn empty_history_passes() {
        let outcome = Verifier::new(Difficulty(5)).verify(Vec::<String>::new());
        assert_eq!(outcome, VerifyOutcome::Passed { checked: 0 });

        let dir = tempfile::tempdir().expect("tempdir");
        let repo = MemoryRepo::new(dir.path());
        assert!(Verifier::new(Difficulty(5))
            .verify_history(&repo)
            .expect("verify")
            .is_pass());
    }

    #[test]
    fn verification_is_idempotent() {
        let verifier = Verifier::new(Difficulty(3));
        let history = ["000a", "0b"];
        assert_eq!(verifier.verify(history), verifier.verify(history));
    }

    #[test]
    fn comparison_is_case_sensitive_on_zero_only() {
        assert!(!Verifier::new(Difficulty(1)).verify(["O0"]).is_pass());
    }
}
