//! 工具模块
pub mod version_extractor;

pub use self::version_extractor::{Version, VersionExtractor};
