//! 版本提取工具模块
//! 负责用浏览器的版本正则从 UA 中取出 full / major / minor 三段版本号
//! 支持两种分组写法：
//! 1. 外层分组包住后续分组：`((\d+)\.(\d+))`，分组 1/2/3 依次为 full/major/minor
//! 2. 顺序分组：`(\d+)\.(\d+)`，full 为所有分组覆盖的文本，major 取分组 1，
//!    minor 取分组 3，不足三个分组时补 "0"

use std::fmt;
use regex::{Captures, Match, Regex};
use serde::Serialize;

/// 缺失的 minor 段默认值
pub const DEFAULT_MINOR: &str = "0";

/// 版本号三段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub full: String,
    pub major: String,
    pub minor: String,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full)
    }
}

/// 版本提取工具类
pub struct VersionExtractor;

impl VersionExtractor {
    /// 从 UA 中提取版本号
    ///
    /// # 返回值
    /// - `Some(Version)`: 正则命中
    /// - `None`: 正则未命中（不是错误，表示该浏览器没有版本信息）
    pub fn extract(regex: &Regex, user_agent: &str) -> Option<Version> {
        let captures = regex.captures(user_agent)?;
        let groups: Vec<Option<Match>> = captures.iter().skip(1).collect();

        let text = |m: Option<&Option<Match>>| -> Option<String> {
            m.copied().flatten().map(|m| m.as_str().to_string())
        };

        let enclosed = match (groups.first().copied().flatten(), groups.get(1).copied().flatten()) {
            (Some(outer), Some(inner)) => outer.start() <= inner.start() && inner.end() <= outer.end(),
            _ => false,
        };

        let version = if enclosed {
            Version {
                full: text(groups.first()).unwrap_or_default(),
                major: text(groups.get(1)).unwrap_or_default(),
                minor: text(groups.get(2)).unwrap_or_else(|| DEFAULT_MINOR.to_string()),
            }
        } else {
            Version {
                full: Self::span_of_groups(&captures, user_agent),
                major: text(groups.first()).unwrap_or_default(),
                // 只有两个分组时 minor 固定补 "0"，第三个分组存在时才取用
                minor: text(groups.get(2)).unwrap_or_else(|| DEFAULT_MINOR.to_string()),
            }
        };

        Some(version)
    }

    /// 原始捕获结果：分组 0 + 声明的分组，不足 4 项时以 "0" 补齐
    /// 未参与匹配的分组为空串
    pub fn captures(regex: &Regex, user_agent: &str) -> Option<Vec<String>> {
        let captures = regex.captures(user_agent)?;
        let mut values: Vec<String> = captures
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect();
        while values.len() < 4 {
            values.push(DEFAULT_MINOR.to_string());
        }
        Some(values)
    }

    /// 所有参与匹配的分组覆盖的最小区间文本
    fn span_of_groups(captures: &Captures, user_agent: &str) -> String {
        let mut participating = captures.iter().skip(1).flatten();
        let Some(first) = participating.next() else {
            return String::new();
        };
        let (start, end) = participating.fold((first.start(), first.end()), |(s, e), m| {
            (s.min(m.start()), e.max(m.end()))
        });
        user_agent[start..end].to_string()
    }
}
