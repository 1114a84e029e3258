//! # 依赖注入具体实现
//!
//! 提供组件注册表、后置处理器流水线、组件发现器和单例组件工厂的具体实现。
//!
//! 单例工厂使用三级缓存容忍循环依赖，见 [`DefaultBeanFactory`]。

pub mod discovery;
pub mod factory;
pub mod pipeline;
pub mod registry;

pub use discovery::{InventoryDiscovery, StaticDiscovery};
pub use factory::{DefaultBeanFactory, SingletonTier};
pub use pipeline::PostProcessorPipeline;
pub use registry::{ComponentRegistryImpl, ScanReport};
