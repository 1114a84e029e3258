//! # AOP Abstractions
//!
//! 拦截层抽象，定义通知类型、连接点和切面声明。
//!
//! ## 核心接口
//!
//! - [`AdviceKind`] - 通知类型（BEFORE / AFTER / AROUND / AFTER_THROWING）
//! - [`AdviceHandler`] - 绑定到切面实例后的通知处理函数
//! - [`AspectDefinition`] - 切面声明，由组件定义携带
//! - [`JoinPoint`] / [`ProceedingJoinPoint`] - 通知可见的调用上下文

pub mod advice;
pub mod aspect;
pub mod join_point;

pub use advice::*;
pub use aspect::*;
pub use join_point::*;
