//! src/utils.rs
//!
//! 存放可复用的、无状态的工具函数。

/// 把文本拆成去掉首尾空白后的非空行。
pub fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// 文本中是否包含任意一个候选子串（区分大小写）。
pub fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// 不区分大小写的子串判断。调用方应传入已转为小写的 `haystack_lower`。
pub fn contains_ignore_case(haystack_lower: &str, needle: &str) -> bool {
    haystack_lower.contains(&needle.to_lowercase())
}

/// 将字符串截断到指定的最大宽度，如果发生截断则添加"..."
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        return s.to_string();
    }

    if max_width < 3 {
        return s.chars().take(max_width).collect();
    }

    format!("{}...", s.chars().take(max_width - 3).collect::<String>())
}
