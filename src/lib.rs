//! rsuseragent - 基于层级规则库的 User-Agent 浏览器/操作系统识别
//!
//! 规则库在启动时一次性加载为不可变的 [`ClassificationModel`]，之后的识别都是只读查询：
//!
//! ```no_run
//! use rsuseragent::RuleLoader;
//!
//! let model = RuleLoader::load_file("data/useragent.yml")?;
//! let result = model.classify("Mozilla/5.0 (iPhone; CPU iPhone OS 8_0 like Mac OS X) Mobile Safari/600.1");
//! println!("{} / {}", result.browser.name(), result.operating_system.name());
//! # Ok::<(), rsuseragent::UaError>(())
//! ```

// 导出全局错误类型
pub use self::error::{UaError, UaResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{
    Application, ApplicationType, BrowserType, DeviceType, Manufacturer, ReferenceTable,
    ReferenceTables, RenderingEngine, RuleLoader,
};

// 导出分类树核心接口
pub use self::taxonomy::{Browser, Forest, Node, NodeId, OperatingSystem};

// 导出分类器核心接口
pub use self::classifier::{
    BrowserReport, Classification, ClassificationModel, ClassificationReport, OperatingSystemReport,
};

// 导出工具模块核心接口
pub use self::utils::{Version, VersionExtractor};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod taxonomy;
pub mod classifier;
pub mod utils;
