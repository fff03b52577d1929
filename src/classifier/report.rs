//! 识别结果：借用模型的结果句柄 + 可序列化的扁平报告（用于 CLI / JSON 输出）

use std::fmt;
use serde::Serialize;

use crate::error::UaResult;
use crate::taxonomy::{Browser, OperatingSystem};
use crate::utils::version_extractor::Version;

/// 一次 UA 识别的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'m> {
    pub browser: Browser<'m>,
    pub operating_system: OperatingSystem<'m>,
}

impl<'m> Classification<'m> {
    /// 生成扁平报告（版本号需要原始 UA）
    pub fn report(&self, user_agent: &str) -> ClassificationReport {
        ClassificationReport {
            user_agent: user_agent.to_string(),
            browser: BrowserReport::new(&self.browser, user_agent),
            operating_system: OperatingSystemReport::new(&self.operating_system),
        }
    }
}

/// 浏览器报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowserReport {
    pub id: u16,
    pub key: String,
    pub name: String,
    pub group: String,
    pub manufacturer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendering_engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl BrowserReport {
    fn new(browser: &Browser<'_>, user_agent: &str) -> Self {
        Self {
            id: browser.id(),
            key: browser.key().to_string(),
            name: browser.name().to_string(),
            group: browser.group().to_string(),
            manufacturer: browser.manufacturer().name.clone(),
            browser_type: browser.browser_type().map(|t| t.name.clone()),
            rendering_engine: browser.rendering_engine().map(|e| e.name.clone()),
            version: browser.version(user_agent),
        }
    }
}

/// 操作系统报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatingSystemReport {
    pub id: u16,
    pub key: String,
    pub name: String,
    pub group: String,
    pub manufacturer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
}

impl OperatingSystemReport {
    fn new(os: &OperatingSystem<'_>) -> Self {
        Self {
            id: os.id(),
            key: os.key().to_string(),
            name: os.name().to_string(),
            group: os.group().to_string(),
            manufacturer: os.manufacturer().name.clone(),
            device_type: os.device_type().map(|t| t.name.clone()),
        }
    }
}

/// 完整报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationReport {
    pub user_agent: String,
    pub browser: BrowserReport,
    pub operating_system: OperatingSystemReport,
}

impl ClassificationReport {
    /// 单行 JSON（CLI `--json` 输出）
    pub fn to_json(&self) -> UaResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ======== 为 ClassificationReport 实现 Display trait（用于 CLI 输出） ========
impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.browser.version {
            Some(v) if !v.full.is_empty() => write!(f, "{} {}", self.browser.name, v)?,
            _ => write!(f, "{}", self.browser.name)?,
        }
        write!(f, " ({})", self.operating_system.name)
    }
}
