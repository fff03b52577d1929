//! 规则模块：负责参考表数据模型定义与规则文件加载
pub mod model;
pub mod loader;

// 导出核心接口
pub use self::model::{
    Application, ApplicationType, BrowserType, DeviceType, Manufacturer, ReferenceTable,
    ReferenceTables, RenderingEngine,
};
pub use self::loader::RuleLoader;
