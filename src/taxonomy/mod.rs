//! 分类树模块：浏览器与操作系统两片森林的数据模型
pub mod forest;
pub mod node;
pub mod browser;
pub mod operating_system;

pub use self::forest::{Forest, NodeId};
pub use self::node::Node;
pub use self::browser::{Browser, BrowserAttrs};
pub use self::operating_system::{OperatingSystem, OperatingSystemAttrs};
