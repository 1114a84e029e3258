//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn IoC 容器各层共享的基础类型。
//!
//! ## 核心组件
//!
//! - [`BeanRef`] - 类型擦除后的组件实例句柄
//! - [`Invocable`] - 按操作名调用的接口面，拦截层在此之上工作
//! - [`OperationSignature`] - 操作签名，切点匹配的输入
//! - [`NamingConventions`] - 组件命名约定
//! - [`ContextState`] - 容器生命周期状态
//!
//! ## 设计原则
//!
//! - 组件以 `Arc` 共享，单例身份即指针身份
//! - 错误使用 `thiserror` 定义的强类型枚举
//! - 约定优于配置

pub mod component;
pub mod conventions;
pub mod errors;
pub mod invocation;
pub mod lifecycle;
pub mod metadata;

pub use component::*;
pub use conventions::*;
pub use errors::*;
pub use invocation::*;
pub use lifecycle::*;
pub use metadata::*;
