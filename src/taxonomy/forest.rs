//! 分类树存储：以下标寻址的节点池（arena）
//! 子节点由父节点的下标列表持有，parent 仅作为继承查找用的回指下标

use crate::error::{UaError, UaResult};

/// 节点在所属森林中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 树节点（浏览器与操作系统共用外形，`A` 为各自的专属属性）
#[derive(Debug, Clone)]
pub struct TaxonomyNode<A> {
    pub(crate) id: u16,
    pub(crate) key: String,
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) exclude_list: Vec<String>,
    // 加载时预先转小写，查询时只需转换一次 UA
    pub(crate) aliases_lower: Vec<String>,
    pub(crate) exclude_lower: Vec<String>,
    pub(crate) manufacturer: Option<String>,
    pub(crate) attrs: A,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl<A: Default> TaxonomyNode<A> {
    pub(crate) fn new(key: &str) -> Self {
        Self {
            id: 0,
            key: key.to_string(),
            name: String::new(),
            aliases: Vec::new(),
            exclude_list: Vec::new(),
            aliases_lower: Vec::new(),
            exclude_lower: Vec::new(),
            manufacturer: None,
            attrs: A::default(),
            parent: None,
            children: Vec::new(),
        }
    }
}

impl<A> TaxonomyNode<A> {
    pub(crate) fn set_aliases(&mut self, aliases: Vec<String>) {
        self.aliases_lower = aliases.iter().map(|a| a.to_lowercase()).collect();
        self.aliases = aliases;
    }

    pub(crate) fn set_exclude_list(&mut self, exclude_list: Vec<String>) {
        self.exclude_lower = exclude_list.iter().map(|e| e.to_lowercase()).collect();
        self.exclude_list = exclude_list;
    }
}

/// 森林：按配置顺序排列的根节点 + unknown 默认节点
#[derive(Debug, Clone)]
pub struct Forest<A> {
    nodes: Vec<TaxonomyNode<A>>,
    roots: Vec<NodeId>,
    unknown: NodeId,
}

impl<A> Forest<A> {
    pub(crate) fn node(&self, id: NodeId) -> &TaxonomyNode<A> {
        &self.nodes[id.0]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// 未匹配时返回的默认节点
    pub fn unknown(&self) -> NodeId {
        self.unknown
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 全森林按键查找（深度优先、配置顺序），键在不同分支重复时返回第一个
    pub fn find_by_key(&self, key: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.key == key {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// 自身及所有祖先，由近到远
    pub(crate) fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &TaxonomyNode<A>> {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let current = self.node(next?);
            next = current.parent;
            Some(current)
        })
    }

    /// 就近继承：返回自身或最近一个设置了该属性的祖先的值
    pub(crate) fn resolve<'a, T: ?Sized>(
        &'a self,
        id: NodeId,
        pick: impl Fn(&'a TaxonomyNode<A>) -> Option<&'a T>,
    ) -> Option<&'a T> {
        self.ancestors(id).find_map(pick)
    }

    /// 根祖先（无父节点时为自身）
    pub(crate) fn root_of(&self, id: NodeId) -> &TaxonomyNode<A> {
        // ancestors 至少产出自身
        self.ancestors(id).last().unwrap_or_else(|| self.node(id))
    }
}

/// 自上而下构建森林，构建完成后不可变
#[derive(Debug)]
pub(crate) struct ForestBuilder<A> {
    nodes: Vec<TaxonomyNode<A>>,
    roots: Vec<NodeId>,
}

impl<A> ForestBuilder<A> {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new(), roots: Vec::new() }
    }

    /// 追加节点并挂到父节点（或根列表）末尾，保持配置顺序
    pub(crate) fn push(&mut self, mut node: TaxonomyNode<A>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = parent;
        self.nodes.push(node);
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TaxonomyNode<A> {
        &mut self.nodes[id.0]
    }

    /// 构建过程中的祖先链视图（用于计算派生 id）
    pub(crate) fn resolve<'a, T: ?Sized>(
        &'a self,
        id: NodeId,
        pick: impl Fn(&'a TaxonomyNode<A>) -> Option<&'a T>,
    ) -> Option<&'a T> {
        let mut next = Some(id);
        while let Some(current) = next {
            let node = &self.nodes[current.0];
            if let Some(value) = pick(node) {
                return Some(value);
            }
            next = node.parent;
        }
        None
    }

    /// 完成构建；顶层必须存在键为 unknown 的节点
    pub(crate) fn finish(self, section: &'static str) -> UaResult<Forest<A>> {
        let unknown = self
            .roots
            .iter()
            .copied()
            .find(|id| self.nodes[id.0].key == "unknown")
            .ok_or(UaError::MissingSentinel(section))?;

        Ok(Forest {
            nodes: self.nodes,
            roots: self.roots,
            unknown,
        })
    }
}
