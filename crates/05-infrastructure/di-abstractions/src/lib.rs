//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件定义、注册和解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentDefinition`] - 组件定义：构造、依赖、生命周期回调、切面声明
//! - [`Autowired`] / [`DependencyDescriptor`] - 按名称注入的依赖槽位
//! - [`BeanPostProcessor`] - 组件后置处理器
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`BeanResolver`] - 按名称解析组件
//! - [`ComponentDiscovery`] - 组件发现接口

pub mod container;
pub mod discovery;
pub mod factory;
pub mod injection;
pub mod post_processor;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use discovery::*;
pub use factory::*;
pub use injection::*;
pub use post_processor::*;
pub use registry::*;
pub use resolver::*;

pub use inventory;
