//! 浏览器节点：浏览器类型、渲染引擎、版本正则三项专属属性

use regex::Regex;

use super::node::Node;
use crate::rule::model::{BrowserType, ReferenceTables, RenderingEngine};
use crate::utils::version_extractor::{Version, VersionExtractor};

/// 浏览器专属属性（均可继承）
#[derive(Debug, Clone, Default)]
pub struct BrowserAttrs {
    pub(crate) browser_type: Option<String>,
    pub(crate) rendering_engine: Option<String>,
    pub(crate) version_regex: Option<Regex>,
}

/// 浏览器句柄
pub type Browser<'m> = Node<'m, BrowserAttrs>;

impl<'m> Node<'m, BrowserAttrs> {
    pub fn browser_type(&self) -> Option<&'m BrowserType> {
        self.resolve_reference(|n| n.attrs.browser_type.as_deref(), ReferenceTables::browser_type)
    }

    pub fn rendering_engine(&self) -> Option<&'m RenderingEngine> {
        self.resolve_reference(|n| n.attrs.rendering_engine.as_deref(), ReferenceTables::rendering_engine)
    }

    /// 最近一个设置了版本正则的节点（含自身）的正则
    pub fn version_regex(&self) -> Option<&'m Regex> {
        self.forest.resolve(self.node_id, |n| n.attrs.version_regex.as_ref())
    }

    /// 提取版本号；未配置正则或正则未命中时返回 None
    pub fn version(&self, user_agent: &str) -> Option<Version> {
        VersionExtractor::extract(self.version_regex()?, user_agent)
    }

    /// 原始捕获结果（分组 0 + 各分组，补齐到 4 项）
    pub fn version_captures(&self, user_agent: &str) -> Option<Vec<String>> {
        VersionExtractor::captures(self.version_regex()?, user_agent)
    }
}
