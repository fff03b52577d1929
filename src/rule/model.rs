//! 参考表数据模型定义
//! 仅存储加载后的只读记录，无任何匹配逻辑

use std::collections::HashMap;
use std::fmt;
use serde::Serialize;

/// 参考表键的命名空间前缀，用于区分参考表键与树节点键
pub const KEY_PREFIX: char = ':';

/// 将键规范化为带前缀形式（`apple` 与 `:apple` 视为同一键）
pub fn namespaced_key(key: &str) -> String {
    if key.starts_with(KEY_PREFIX) {
        key.to_string()
    } else {
        format!("{}{}", KEY_PREFIX, key)
    }
}

/// 应用类型
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationType {
    pub key: String,
    pub name: String,
}

/// 设备类型
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceType {
    pub key: String,
    pub name: String,
}

/// 浏览器类型
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrowserType {
    pub key: String,
    pub name: String,
}

/// 渲染引擎
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderingEngine {
    pub key: String,
    pub name: String,
}

/// 厂商，`id` 作为所属浏览器/操作系统标识的高字节
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manufacturer {
    pub id: u16,
    pub key: String,
    pub name: String,
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// 未设置厂商且规则库未注册 unknown 厂商时的零值记录
pub(crate) static ZERO_MANUFACTURER: Manufacturer = Manufacturer {
    id: 0,
    key: String::new(),
    name: String::new(),
};

/// 应用（仅随规则库加载，不参与分类匹配）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Application {
    pub id: u16,
    pub key: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub application_type: Option<String>,
    pub manufacturer: Option<String>,
}

/// 单张参考表：带前缀键 -> 记录
#[derive(Debug, Clone)]
pub struct ReferenceTable<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for ReferenceTable<T> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<T> ReferenceTable<T> {
    pub(crate) fn insert(&mut self, key: &str, record: T) {
        self.entries.insert(namespaced_key(key), record);
    }

    /// 按键查询，键可带或不带前缀
    pub fn get(&self, key: &str) -> Option<&T> {
        if key.starts_with(KEY_PREFIX) {
            self.entries.get(key)
        } else {
            self.entries.get(&namespaced_key(key))
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 遍历所有记录（键为带前缀形式，顺序不保证）
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// 全部参考表
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub application_types: ReferenceTable<ApplicationType>,
    pub device_types: ReferenceTable<DeviceType>,
    pub browser_types: ReferenceTable<BrowserType>,
    pub rendering_engines: ReferenceTable<RenderingEngine>,
    pub manufacturers: ReferenceTable<Manufacturer>,
    pub applications: ReferenceTable<Application>,
}

impl ReferenceTables {
    pub fn application_type(&self, key: &str) -> Option<&ApplicationType> {
        self.application_types.get(key)
    }

    pub fn device_type(&self, key: &str) -> Option<&DeviceType> {
        self.device_types.get(key)
    }

    pub fn browser_type(&self, key: &str) -> Option<&BrowserType> {
        self.browser_types.get(key)
    }

    pub fn rendering_engine(&self, key: &str) -> Option<&RenderingEngine> {
        self.rendering_engines.get(key)
    }

    pub fn manufacturer(&self, key: &str) -> Option<&Manufacturer> {
        self.manufacturers.get(key)
    }

    pub fn application(&self, key: &str) -> Option<&Application> {
        self.applications.get(key)
    }

    /// 整条祖先链都未设置厂商时使用：已注册的 unknown 厂商，否则零值记录
    pub fn default_manufacturer(&self) -> &Manufacturer {
        self.manufacturers.get("unknown").unwrap_or(&ZERO_MANUFACTURER)
    }
}
