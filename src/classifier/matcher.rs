//! 匹配算法：别名包含测试 + 子节点优先 + 排除列表否决
//! 森林按配置顺序尝试，首个命中的根分支胜出

use tracing::trace;

use crate::taxonomy::forest::{Forest, NodeId};

/// UA（已转小写）是否包含任一候选子串（候选在加载时已转小写）
pub(crate) fn contains_any(user_agent_lower: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| user_agent_lower.contains(needle.as_str()))
}

/// 单节点递归匹配
///
/// 1. 别名均不包含于 UA 时不匹配（无别名的节点永远不会匹配）
/// 2. 按配置顺序尝试子节点，首个命中的子节点直接胜出，不再检查本节点排除列表
/// 3. 无子节点命中时，排除列表任一命中即否决本节点，不回退到父节点
pub(crate) fn match_node<A>(forest: &Forest<A>, node_id: NodeId, user_agent_lower: &str) -> Option<NodeId> {
    let node = forest.node(node_id);
    if !contains_any(user_agent_lower, &node.aliases_lower) {
        return None;
    }

    if let Some(matched) = node
        .children
        .iter()
        .find_map(|&child| match_node(forest, child, user_agent_lower))
    {
        return Some(matched);
    }

    if contains_any(user_agent_lower, &node.exclude_lower) {
        trace!("节点 {} 别名命中但被排除列表否决", node.key);
        return None;
    }

    Some(node_id)
}

/// 在整片森林中查找，全部根分支都未命中时返回 unknown 节点
pub(crate) fn find_in_forest<A>(forest: &Forest<A>, user_agent: &str) -> NodeId {
    let user_agent_lower = user_agent.to_lowercase();
    forest
        .roots()
        .iter()
        .find_map(|&root| match_node(forest, root, &user_agent_lower))
        .unwrap_or_else(|| forest.unknown())
}
