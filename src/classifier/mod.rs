//! 分类模块：匹配算法与只读查询接口
pub mod matcher;
pub mod classifier;
pub mod report;

// 导出核心接口
pub use self::classifier::ClassificationModel;
pub use self::report::{BrowserReport, Classification, ClassificationReport, OperatingSystemReport};
