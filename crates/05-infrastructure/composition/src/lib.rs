//! # 基础设施组合层
//!
//! 把组件注册表、单例工厂、后置处理器流水线和拦截层组合为一个可运行的应用上下文。
//!
//! ## 主要功能
//!
//! - **应用上下文**: 创建 → 扫描 → 预创建单例 → 就绪 → 关闭
//! - **配置加载**: 配置文件与 `IOC_` 环境变量
//! - **日志初始化**: 基于 `tracing-subscriber`
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{ApplicationContext, LoggingConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = ApplicationContext::builder()
//!         .root_namespace("demo")
//!         .with_logging(LoggingConfig::development())
//!         .start()?;
//!
//!     let user_service = context.get_invocable("userService")?;
//!     user_service.invoke("createUser", &["alice".into()])?;
//!
//!     context.close()?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod logging;
pub mod settings;

#[cfg(test)]
mod tests;

pub use builder::ApplicationContextBuilder;
pub use context::ApplicationContext;
pub use logging::LoggingConfig;
pub use settings::ContextSettings;

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
