//! # 拦截层实现
//!
//! - [`Pointcut`] - 切点表达式编译与匹配
//! - [`AspectRegistry`] / [`AdviceBinding`] - 绑定到切面实例的通知，按执行顺序排列
//! - [`AopProxy`] - 包装组件接口面的拦截代理
//! - [`AopPostProcessor`] - 为命中通知的组件自动创建代理的后置处理器

pub mod auto_proxy;
pub mod pointcut;
pub mod proxy;
pub mod registry;

pub use auto_proxy::AopPostProcessor;
pub use pointcut::Pointcut;
pub use proxy::AopProxy;
pub use registry::{AdviceBinding, AspectRegistry};
