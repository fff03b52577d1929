//! 节点只读句柄：森林 + 参考表 + 节点下标
//! 所有继承属性都在查询时沿 parent 向上解析，不在加载时展开

use std::fmt;

use super::forest::{Forest, NodeId, TaxonomyNode};
use crate::rule::model::{Manufacturer, ReferenceTables};

/// 分类树节点句柄，浏览器与操作系统共用
pub struct Node<'m, A> {
    pub(crate) tables: &'m ReferenceTables,
    pub(crate) forest: &'m Forest<A>,
    pub(crate) node_id: NodeId,
}

impl<'m, A> Clone for Node<'m, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'m, A> Copy for Node<'m, A> {}

impl<'m, A> PartialEq for Node<'m, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.forest, other.forest) && self.node_id == other.node_id
    }
}

impl<'m, A> Eq for Node<'m, A> {}

impl<'m, A> fmt::Debug for Node<'m, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key())
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

impl<'m, A> fmt::Display for Node<'m, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl<'m, A> Node<'m, A> {
    pub(crate) fn new(tables: &'m ReferenceTables, forest: &'m Forest<A>, node_id: NodeId) -> Self {
        Self { tables, forest, node_id }
    }

    pub(crate) fn raw(&self) -> &'m TaxonomyNode<A> {
        self.forest.node(self.node_id)
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// 派生标识：厂商 id 为高字节，配置中的本地 id 为低字节
    pub fn id(&self) -> u16 {
        self.raw().id
    }

    pub fn key(&self) -> &'m str {
        &self.raw().key
    }

    pub fn name(&self) -> &'m str {
        &self.raw().name
    }

    pub fn aliases(&self) -> &'m [String] {
        &self.raw().aliases
    }

    pub fn exclude_list(&self) -> &'m [String] {
        &self.raw().exclude_list
    }

    /// 是否为未匹配时返回的默认节点
    pub fn is_unknown(&self) -> bool {
        self.node_id == self.forest.unknown()
    }

    pub fn parent(&self) -> Option<Self> {
        self.raw().parent.map(|p| Self::new(self.tables, self.forest, p))
    }

    pub fn children(&self) -> impl Iterator<Item = Self> + use<'m, A> {
        let (tables, forest) = (self.tables, self.forest);
        self.raw().children.iter().map(move |&c| Self::new(tables, forest, c))
    }

    /// 分组名：有父节点时取根祖先的名称，否则取自身名称
    pub fn group(&self) -> &'m str {
        &self.forest.root_of(self.node_id).name
    }

    /// 厂商：自身未设置时沿祖先继承，整条链都未设置时返回默认厂商
    pub fn manufacturer(&self) -> &'m Manufacturer {
        self.forest
            .resolve(self.node_id, |n| n.manufacturer.as_deref())
            .and_then(|key| self.tables.manufacturer(key))
            .unwrap_or_else(|| self.tables.default_manufacturer())
    }

    /// 继承解析某个参考表属性，祖先链都未设置时退回该表的 unknown 记录
    pub(crate) fn resolve_reference<T>(
        &self,
        pick: impl Fn(&'m TaxonomyNode<A>) -> Option<&'m str>,
        lookup: impl Fn(&'m ReferenceTables, &str) -> Option<&'m T>,
    ) -> Option<&'m T> {
        match self.forest.resolve(self.node_id, pick) {
            Some(key) => lookup(self.tables, key),
            None => lookup(self.tables, "unknown"),
        }
    }
}
