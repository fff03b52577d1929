//! 分类器核心：加载完成后只读的分类模型
//! 模型不可变，可通过 `Arc` 在多线程间共享，无需加锁

use tracing::debug;

use super::matcher::find_in_forest;
use super::report::Classification;
use crate::rule::model::ReferenceTables;
use crate::taxonomy::{Browser, BrowserAttrs, Forest, Node, OperatingSystem, OperatingSystemAttrs};

/// 分类模型：参考表 + 浏览器森林 + 操作系统森林
#[derive(Debug, Clone)]
pub struct ClassificationModel {
    tables: ReferenceTables,
    browsers: Forest<BrowserAttrs>,
    operating_systems: Forest<OperatingSystemAttrs>,
}

impl ClassificationModel {
    pub(crate) fn new(
        tables: ReferenceTables,
        browsers: Forest<BrowserAttrs>,
        operating_systems: Forest<OperatingSystemAttrs>,
    ) -> Self {
        Self {
            tables,
            browsers,
            operating_systems,
        }
    }

    /// 参考表只读访问
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn browser_forest(&self) -> &Forest<BrowserAttrs> {
        &self.browsers
    }

    pub fn operating_system_forest(&self) -> &Forest<OperatingSystemAttrs> {
        &self.operating_systems
    }

    /// 识别浏览器，未命中时返回 unknown 节点
    pub fn classify_browser(&self, user_agent: &str) -> Browser<'_> {
        let node_id = find_in_forest(&self.browsers, user_agent);
        let browser = Node::new(&self.tables, &self.browsers, node_id);
        debug!("浏览器识别结果：{}，UA={}", browser.key(), user_agent);
        browser
    }

    /// 识别操作系统，未命中时返回 unknown 节点
    pub fn classify_operating_system(&self, user_agent: &str) -> OperatingSystem<'_> {
        let node_id = find_in_forest(&self.operating_systems, user_agent);
        let os = Node::new(&self.tables, &self.operating_systems, node_id);
        debug!("操作系统识别结果：{}，UA={}", os.key(), user_agent);
        os
    }

    /// 同时识别浏览器与操作系统（两次独立查询）
    pub fn classify(&self, user_agent: &str) -> Classification<'_> {
        Classification {
            browser: self.classify_browser(user_agent),
            operating_system: self.classify_operating_system(user_agent),
        }
    }

    /// 按键查找浏览器节点（任意层级）
    pub fn browser(&self, key: &str) -> Option<Browser<'_>> {
        self.browsers
            .find_by_key(key)
            .map(|id| Node::new(&self.tables, &self.browsers, id))
    }

    /// 按键查找操作系统节点（任意层级）
    pub fn operating_system(&self, key: &str) -> Option<OperatingSystem<'_>> {
        self.operating_systems
            .find_by_key(key)
            .map(|id| Node::new(&self.tables, &self.operating_systems, id))
    }

    pub fn unknown_browser(&self) -> Browser<'_> {
        Node::new(&self.tables, &self.browsers, self.browsers.unknown())
    }

    pub fn unknown_operating_system(&self) -> OperatingSystem<'_> {
        Node::new(&self.tables, &self.operating_systems, self.operating_systems.unknown())
    }
}
