//! 核心工具函数模块
//! Core utilities module
//!
//! 难度谓词：提交哈希的文本形式必须以 `k` 个连续的 `'0'` 字符开头。
//! 比较区分大小写，git 输出的哈希按惯例是小写十六进制。

/// 计算标识文本开头连续 `'0'` 字符的个数。
///
/// 与按位计数不同，这里按字符计数：每个十六进制字符对应 4 位。
pub fn leading_zero_chars(identity: &str) -> usize {
    identity.bytes().take_while(|b| *b == b'0').count()
}

/// 判断标识是否满足 `k` 个前导零的难度。`k = 0` 总是满足。
#[inline]
pub fn meets_difficulty(identity: &str, k: u32) -> bool {
    leading_zero_chars(identity) >= k as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_leading_zero_characters() {
        assert_eq!(leading_zero_chars("000fcab1"), 3);
        assert_eq!(leading_zero_chars("abc12300"), 0);
        assert_eq!(leading_zero_chars("0000"), 4);
        assert_eq!(leading_zero_chars(""), 0);
    }

    #[test]
    fn zero_difficulty_accepts_anything() {
        assert!(meets_difficulty("ffff", 0));
        assert!(meets_difficulty("", 0));
    }

    #[test]
    fn predicate_is_at_least_not_exactly() {
        // 多于 k 个前导零同样满足
        assert!(meets_difficulty("00000a", 3));
        assert!(!meets_difficulty("00a000", 3));
    }

    #[test]
    fn only_ascii_zero_counts() {
        // 大写 'O' 或其他字符不算作零
        assert!(!meets_difficulty("O00abc", 1));
        assert_eq!(leading_zero_chars("0O0"), 1);
    }
}
