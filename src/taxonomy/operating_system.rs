//! 操作系统节点：仅有设备类型一项专属属性，不支持版本提取

use super::node::Node;
use crate::rule::model::{DeviceType, ReferenceTables};

#[derive(Debug, Clone, Default)]
pub struct OperatingSystemAttrs {
    pub(crate) device_type: Option<String>,
}

/// 操作系统句柄
pub type OperatingSystem<'m> = Node<'m, OperatingSystemAttrs>;

impl<'m> Node<'m, OperatingSystemAttrs> {
    pub fn device_type(&self) -> Option<&'m DeviceType> {
        self.resolve_reference(|n| n.attrs.device_type.as_deref(), ReferenceTables::device_type)
    }
}
