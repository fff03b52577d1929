//! 全局错误类型定义
//! 加载期的结构错误全部在此汇总；查询期"未匹配"不是错误，不在此列

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use serde_yaml::Error as SerdeYamlError;
use std::io::Error as IoError;

#[derive(Error, Debug)]
pub enum UaError {
    // 规则相关错误
    #[error("规则解析失败：{0}")]
    RuleParse(String),
    #[error("未知字段：{section} 中不支持 `{field}`")]
    UnknownField { section: String, field: String },
    #[error("{path} 使用了已废弃字段 `{field}`，请改为嵌套 children")]
    DeprecatedField { path: String, field: String },
    #[error("{path} 引用了未注册的{kind}：{key}")]
    UnknownReference { kind: &'static str, key: String, path: String },
    #[error("{path} 的 id 超出 8 位范围：{id}")]
    IdOutOfRange { path: String, id: i64 },
    #[error("{path} 的 id 超出 16 位无符号范围：{id}")]
    IdOverflow { path: String, id: i64 },
    #[error("{0} 缺少顶层 unknown 默认节点")]
    MissingSentinel(&'static str),

    // 编译相关错误
    #[error("正则编译失败：{0}")]
    RegexCompile(#[from] RegexError),
    #[error("{path} 的版本正则不含捕获分组：{pattern}")]
    InvalidVersionPattern { path: String, pattern: String },

    // 序列化/反序列化错误
    #[error("YAML解析失败：{0}")]
    Yaml(#[from] SerdeYamlError),
    #[error("JSON序列化失败：{0}")]
    Json(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    Io(#[from] IoError),
}

// 全局Result类型
pub type UaResult<T> = Result<T, UaError>;
