//! 重入保护模块
//! Reentrancy guard module
//!
//! amend 操作本身可能再次触发启动挖矿的 post-commit 钩子。
//! 保护状态是一个显式传入挖矿循环的对象，而不是进程级的环境变量。

use std::sync::atomic::{AtomicBool, Ordering};

/// git 子进程上设置的标记变量名，只存在于子进程环境中。
pub const MINING_MARKER_ENV: &str = "GITPOW_MINING";

/// 重入保护。
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    held: AtomicBool,
}

impl ReentrancyGuard {
    /// 创建一个未被持有的保护。
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// 创建一个已被外部持有的保护 (例如钩子由本工具自己的 amend 触发)。
    pub const fn held() -> Self {
        Self {
            held: AtomicBool::new(true),
        }
    }

    /// 根据 git 传下来的标记值构建保护。
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some(value) if !value.is_empty() && value != "0" => Self::held(),
            _ => Self::new(),
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    /// 尝试进入。已被持有时返回 `None`。
    pub fn enter(&self) -> Option<GuardToken<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| GuardToken { guard: self })
    }
}

/// 持有期间保护处于锁定状态；drop 时释放。
#[derive(Debug)]
pub struct GuardToken<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.held.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_is_exclusive_and_released_on_drop() {
        let guard = ReentrancyGuard::new();
        let token = guard.enter().expect("first entry");
        assert!(guard.is_held());
        assert!(guard.enter().is_none());
        drop(token);
        assert!(!guard.is_held());
        assert!(guard.enter().is_some());
    }

    #[test]
    fn marker_values() {
        assert!(ReentrancyGuard::from_marker(Some("1")).is_held());
        assert!(!ReentrancyGuard::from_marker(Some("0")).is_held());
        assert!(!ReentrancyGuard::from_marker(Some("")).is_held());
        assert!(!ReentrancyGuard::from_marker(None).is_held());
    }

    #[test]
    fn externally_held_guard_never_admits() {
        let guard = ReentrancyGuard::held();
        assert!(guard.enter().is_none());
        assert!(guard.is_held());
    }
}
