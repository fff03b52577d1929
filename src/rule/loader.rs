//! 规则加载管理器
//! 负责把 YAML 文档树转换为参考表与两片分类森林，加载失败即整体失败，不存在部分加载状态

use std::path::Path;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use super::model::{
    namespaced_key, Application, ApplicationType, BrowserType, DeviceType, Manufacturer,
    ReferenceTable, ReferenceTables, RenderingEngine, KEY_PREFIX,
};
use crate::classifier::ClassificationModel;
use crate::config::GlobalConfig;
use crate::error::{UaError, UaResult};
use crate::taxonomy::forest::{ForestBuilder, NodeId, TaxonomyNode};
use crate::taxonomy::{BrowserAttrs, OperatingSystemAttrs};

/// 顶层可识别的分区，按依赖顺序处理（参考表先于森林）
const SECTIONS: [&str; 8] = [
    "application_types",
    "device_types",
    "browser_types",
    "rendering_engines",
    "manufacturers",
    "applications",
    "browsers",
    "operating_systems",
];

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 按配置异步读取规则文件并构建分类模型
    pub async fn load(config: &GlobalConfig) -> UaResult<ClassificationModel> {
        let content = tokio::fs::read_to_string(&config.rule_file).await?;
        debug!("规则文件读取成功：{}，{} 字节", config.rule_file.display(), content.len());
        Self::from_yaml_str(&content)
    }

    /// 同步读取规则文件
    pub fn load_file(path: impl AsRef<Path>) -> UaResult<ClassificationModel> {
        let content = std::fs::read_to_string(path.as_ref())?;
        debug!("规则文件读取成功：{}，{} 字节", path.as_ref().display(), content.len());
        Self::from_yaml_str(&content)
    }

    /// 从 YAML 字符串构建
    pub fn from_yaml_str(yaml: &str) -> UaResult<ClassificationModel> {
        let document: Value = serde_yaml::from_str(yaml)?;
        Self::from_document(&document)
    }

    /// 从已解析的通用文档树构建
    pub fn from_document(document: &Value) -> UaResult<ClassificationModel> {
        let top = as_mapping(document, "<root>")?;

        // 1. 校验顶层结构：键必须是字符串，值必须是映射
        for (key, value) in top {
            let name = key_str(key, "<root>")?;
            if !SECTIONS.contains(&name) {
                warn!("忽略未识别的顶层分区：{}", name);
                continue;
            }
            as_mapping(value, name)?;
        }
        let section = |name: &str| top.get(name).and_then(Value::as_mapping);

        // 2. 参考表
        let mut tables = ReferenceTables::default();
        if let Some(m) = section("application_types") {
            tables.application_types = Self::parse_named_table(m, "application_types", |key, name| {
                ApplicationType { key, name }
            })?;
        }
        if let Some(m) = section("device_types") {
            tables.device_types = Self::parse_named_table(m, "device_types", |key, name| DeviceType { key, name })?;
        }
        if let Some(m) = section("browser_types") {
            tables.browser_types = Self::parse_named_table(m, "browser_types", |key, name| BrowserType { key, name })?;
        }
        if let Some(m) = section("rendering_engines") {
            tables.rendering_engines = Self::parse_named_table(m, "rendering_engines", |key, name| {
                RenderingEngine { key, name }
            })?;
        }
        if let Some(m) = section("manufacturers") {
            tables.manufacturers = Self::parse_manufacturers(m)?;
        }
        if let Some(m) = section("applications") {
            tables.applications = Self::parse_applications(m, &tables)?;
        }

        // 3. 分类森林
        let mut browsers = ForestBuilder::<BrowserAttrs>::new();
        if let Some(m) = section("browsers") {
            Self::parse_forest(&mut browsers, m, "browsers", &tables)?;
        }
        let browsers = browsers.finish("browsers")?;

        let mut operating_systems = ForestBuilder::<OperatingSystemAttrs>::new();
        if let Some(m) = section("operating_systems") {
            Self::parse_forest(&mut operating_systems, m, "operating_systems", &tables)?;
        }
        let operating_systems = operating_systems.finish("operating_systems")?;

        debug!(
            "参考表统计：应用类型{}、设备类型{}、浏览器类型{}、渲染引擎{}、厂商{}、应用{}",
            tables.application_types.len(),
            tables.device_types.len(),
            tables.browser_types.len(),
            tables.rendering_engines.len(),
            tables.manufacturers.len(),
            tables.applications.len()
        );
        info!(
            "分类模型构建完成：浏览器节点{}个，操作系统节点{}个",
            browsers.len(),
            operating_systems.len()
        );

        Ok(ClassificationModel::new(tables, browsers, operating_systems))
    }

    /// 解析 `键 -> 名称` 形式的简单参考表
    fn parse_named_table<T>(
        mapping: &Mapping,
        section: &str,
        make: impl Fn(String, String) -> T,
    ) -> UaResult<ReferenceTable<T>> {
        let mut table = ReferenceTable::default();
        for (key, value) in mapping {
            let key = key_str(key, section)?;
            let path = format!("{}.{}", section, key);
            let name = scalar_string(value, &path)?;
            table.insert(key, make(bare_key(key), name));
        }
        Ok(table)
    }

    /// 解析厂商表（严格：仅允许 id / name）
    fn parse_manufacturers(mapping: &Mapping) -> UaResult<ReferenceTable<Manufacturer>> {
        let mut table = ReferenceTable::default();
        for (key, value) in mapping {
            let key = key_str(key, "manufacturers")?;
            let path = format!("manufacturers.{}", key);
            let mut manufacturer = Manufacturer {
                key: bare_key(key),
                ..Default::default()
            };
            for (field_key, field_value) in as_mapping(value, &path)? {
                let field = key_str(field_key, &path)?;
                let field_path = format!("{}.{}", path, field);
                match field {
                    "id" => manufacturer.id = u16_id(field_value, &field_path)?,
                    "name" => manufacturer.name = scalar_string(field_value, &field_path)?,
                    _ => {
                        return Err(UaError::UnknownField {
                            section: path,
                            field: field.to_string(),
                        })
                    }
                }
            }
            table.insert(key, manufacturer);
        }
        Ok(table)
    }

    /// 解析应用表（严格），引用的应用类型与厂商必须已注册
    fn parse_applications(mapping: &Mapping, tables: &ReferenceTables) -> UaResult<ReferenceTable<Application>> {
        let mut table = ReferenceTable::default();
        for (key, value) in mapping {
            let key = key_str(key, "applications")?;
            let path = format!("applications.{}", key);
            let mut application = Application {
                key: bare_key(key),
                ..Default::default()
            };
            for (field_key, field_value) in as_mapping(value, &path)? {
                let field = key_str(field_key, &path)?;
                let field_path = format!("{}.{}", path, field);
                match field {
                    "id" => application.id = u16_id(field_value, &field_path)?,
                    "name" => application.name = scalar_string(field_value, &field_path)?,
                    "aliases" => application.aliases = string_list(field_value, &field_path)?,
                    "application_type" => {
                        application.application_type = Some(reference_key(
                            &tables.application_types,
                            "应用类型",
                            field_value,
                            &field_path,
                        )?)
                    }
                    "manufacturer" => {
                        application.manufacturer = Some(reference_key(
                            &tables.manufacturers,
                            "厂商",
                            field_value,
                            &field_path,
                        )?)
                    }
                    _ => {
                        return Err(UaError::UnknownField {
                            section: path,
                            field: field.to_string(),
                        })
                    }
                }
            }
            table.insert(key, application);
        }
        Ok(table)
    }

    /// 按配置顺序构建一片森林
    fn parse_forest<A: NodeFields>(
        builder: &mut ForestBuilder<A>,
        mapping: &Mapping,
        section: &str,
        tables: &ReferenceTables,
    ) -> UaResult<()> {
        for (key, value) in mapping {
            let key = key_str(key, section)?;
            let path = format!("{}.{}", section, key);
            Self::parse_node(builder, tables, None, key, value, &path)?;
        }
        Ok(())
    }

    /// 递归构建单个节点及其子节点
    fn parse_node<A: NodeFields>(
        builder: &mut ForestBuilder<A>,
        tables: &ReferenceTables,
        parent: Option<NodeId>,
        key: &str,
        value: &Value,
        path: &str,
    ) -> UaResult<NodeId> {
        let mut node = TaxonomyNode::<A>::new(key);
        let mut local_id = 0u16;
        let mut children = None;

        for (field_key, field_value) in as_mapping(value, path)? {
            let field = key_str(field_key, path)?;
            let field_path = format!("{}.{}", path, field);
            match field {
                "id" => local_id = local_id_of(field_value, &field_path)?,
                "name" => node.name = scalar_string(field_value, &field_path)?,
                "aliases" => node.set_aliases(string_list(field_value, &field_path)?),
                "exclude_list" => node.set_exclude_list(string_list(field_value, &field_path)?),
                "manufacturer" => {
                    node.manufacturer = Some(reference_key(&tables.manufacturers, "厂商", field_value, &field_path)?)
                }
                "children" => {
                    if !field_value.is_null() {
                        children = Some(as_mapping(field_value, &field_path)?);
                    }
                }
                "parent" => {
                    return Err(UaError::DeprecatedField {
                        path: path.to_string(),
                        field: field.to_string(),
                    })
                }
                _ => {
                    if !node.attrs.load_field(field, field_value, &field_path, tables)? {
                        if A::STRICT {
                            return Err(UaError::UnknownField {
                                section: path.to_string(),
                                field: field.to_string(),
                            });
                        }
                        warn!("{} 中存在未识别字段 `{}`，已忽略", path, field);
                    }
                }
            }
        }

        let node_id = builder.push(node, parent);

        // 派生 id：最近祖先的厂商 id 为高字节
        let manufacturer_id = builder
            .resolve(node_id, |n| n.manufacturer.as_deref())
            .and_then(|k| tables.manufacturer(k))
            .unwrap_or_else(|| tables.default_manufacturer())
            .id;
        if manufacturer_id > 0xFF {
            return Err(UaError::IdOutOfRange {
                path: format!("{}.manufacturer", path),
                id: i64::from(manufacturer_id),
            });
        }
        builder.node_mut(node_id).id = (manufacturer_id << 8) | local_id;

        if let Some(children) = children {
            for (child_key, child_value) in children {
                let child_key = key_str(child_key, path)?;
                let child_path = format!("{}.children.{}", path, child_key);
                Self::parse_node(builder, tables, Some(node_id), child_key, child_value, &child_path)?;
            }
        }

        Ok(node_id)
    }
}

/// 各类节点的专属字段解析
trait NodeFields: Default {
    /// 是否拒绝未识别字段
    const STRICT: bool;

    /// 返回 false 表示该字段不属于本类节点
    fn load_field(&mut self, field: &str, value: &Value, path: &str, tables: &ReferenceTables) -> UaResult<bool>;
}

impl NodeFields for BrowserAttrs {
    const STRICT: bool = false;

    fn load_field(&mut self, field: &str, value: &Value, path: &str, tables: &ReferenceTables) -> UaResult<bool> {
        match field {
            "browser_type" => {
                self.browser_type = Some(reference_key(&tables.browser_types, "浏览器类型", value, path)?);
            }
            "rendering_engine" => {
                self.rendering_engine = Some(reference_key(&tables.rendering_engines, "渲染引擎", value, path)?);
            }
            "version_regex" => {
                let pattern = scalar_string(value, path)?;
                let regex = Regex::new(&pattern)?;
                if regex.captures_len() < 2 {
                    return Err(UaError::InvalidVersionPattern {
                        path: path.to_string(),
                        pattern,
                    });
                }
                self.version_regex = Some(regex);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl NodeFields for OperatingSystemAttrs {
    const STRICT: bool = true;

    fn load_field(&mut self, field: &str, value: &Value, path: &str, tables: &ReferenceTables) -> UaResult<bool> {
        match field {
            "device_type" => {
                self.device_type = Some(reference_key(&tables.device_types, "设备类型", value, path)?);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ======== 文档树访问辅助函数 ========

fn as_mapping<'a>(value: &'a Value, path: &str) -> UaResult<&'a Mapping> {
    value
        .as_mapping()
        .ok_or_else(|| UaError::RuleParse(format!("{} 应为映射，实际为 {}", path, kind_of(value))))
}

fn key_str<'a>(key: &'a Value, path: &str) -> UaResult<&'a str> {
    key.as_str()
        .ok_or_else(|| UaError::RuleParse(format!("{} 的键应为字符串，实际为 {}", path, kind_of(key))))
}

fn scalar_string(value: &Value, path: &str) -> UaResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(UaError::RuleParse(format!("{} 应为标量，实际为 {}", path, kind_of(value)))),
    }
}

fn integer(value: &Value, path: &str) -> UaResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| UaError::RuleParse(format!("{} 应为整数，实际为 {}", path, kind_of(value))))
}

fn u16_id(value: &Value, path: &str) -> UaResult<u16> {
    let id = integer(value, path)?;
    u16::try_from(id).map_err(|_| UaError::IdOverflow { path: path.to_string(), id })
}

/// 节点本地 id 只占低字节
fn local_id_of(value: &Value, path: &str) -> UaResult<u16> {
    let id = integer(value, path)?;
    match u8::try_from(id) {
        Ok(id) => Ok(u16::from(id)),
        Err(_) => Err(UaError::IdOutOfRange { path: path.to_string(), id }),
    }
}

/// 字符串序列；空值视为空列表，序列中的 null 项跳过
fn string_list(value: &Value, path: &str) -> UaResult<Vec<String>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    let sequence = value
        .as_sequence()
        .ok_or_else(|| UaError::RuleParse(format!("{} 应为序列，实际为 {}", path, kind_of(value))))?;
    sequence
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| scalar_string(item, path))
        .collect()
}

/// 读取参考表引用并校验已注册，返回带前缀的键
fn reference_key<T>(table: &ReferenceTable<T>, kind: &'static str, value: &Value, path: &str) -> UaResult<String> {
    let key = scalar_string(value, path)?;
    if !table.contains(&key) {
        return Err(UaError::UnknownReference {
            kind,
            key,
            path: path.to_string(),
        });
    }
    Ok(namespaced_key(&key))
}

fn bare_key(key: &str) -> String {
    key.trim_start_matches(KEY_PREFIX).to_string()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "布尔值",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Sequence(_) => "序列",
        Value::Mapping(_) => "映射",
        Value::Tagged(_) => "带标签值",
    }
}
