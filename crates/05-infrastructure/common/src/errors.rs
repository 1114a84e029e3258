//! 错误类型定义

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// 装箱的动态错误，用于承载用户回调返回的任意错误
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// 配置错误类型
///
/// 所有配置错误都在扫描阶段暴露，早于任何组件创建。
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("组件名称冲突: {name} 同时映射到 {first} 和 {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("组件元数据无效: {type_name}, 原因: {message}")]
    MissingMetadata { type_name: String, message: String },

    #[error("切点表达式无效: {expression}, 原因: {message}")]
    InvalidPointcut { expression: String, message: String },

    #[error("无法为类型 {type_name} 推导组件名称")]
    InvalidName { type_name: String },

    #[error("后置处理器实例化失败: {name}, 原因: {source}")]
    ProcessorInstantiation {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("配置加载失败: {message}")]
    Settings { message: String },
}

impl ConfigurationError {
    /// 创建切点表达式错误
    pub fn invalid_pointcut(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPointcut {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// 创建配置加载错误
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }
}

/// 组件创建所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreationStage {
    /// 构造原始实例
    Instantiate,
    /// 依赖注入
    Wire,
    /// 生命周期回调
    Initialize,
    /// 后置处理器
    PostProcess,
}

impl fmt::Display for CreationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Instantiate => "实例化",
            Self::Wire => "依赖注入",
            Self::Initialize => "初始化回调",
            Self::PostProcess => "后置处理",
        };
        f.write_str(stage)
    }
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {name}")]
    BeanNotFound { name: String },

    #[error("组件 {bean} 的必需依赖 {dependency} 未注册")]
    DependencyMissing { bean: String, dependency: String },

    #[error("组件创建失败: {bean} ({stage}), 原因: {source}")]
    BeanCreation {
        bean: String,
        stage: CreationStage,
        #[source]
        source: BoxError,
    },

    #[error("组件 {name} 正在创建中，且没有可用的早期引用")]
    CurrentlyInCreation { name: String },

    #[error("组件 {name} 的类型不是 {expected}")]
    TypeMismatch { name: String, expected: String },

    #[error("组件 {name} 未暴露可调用接口")]
    NotInvocable { name: String },

    #[error("组件 {name} 已被代理，不能以具体类型 {expected} 访问")]
    ConcreteProxyUnsupported { name: String, expected: String },

    #[error("组件 {name} 的原始实例已注入到循环依赖中，但后置处理器返回了不同的对象")]
    RawReferenceExposed { name: String },

    #[error("组件创建深度超过上限 {limit}: {name}")]
    CreationDepthExceeded { name: String, limit: usize },

    #[error("组件销毁失败: {name}, 原因: {message}")]
    Destroy { name: String, message: String },
}

impl DependencyError {
    /// 创建组件创建失败错误
    pub fn creation(
        bean: impl Into<String>,
        stage: CreationStage,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::BeanCreation {
            bean: bean.into(),
            stage,
            source: source.into(),
        }
    }

    /// 创建组件未注册错误
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::BeanNotFound { name: name.into() }
    }

    /// 沿错误链查找缺失的必需依赖，返回 `(组件, 依赖)`
    pub fn missing_dependency(&self) -> Option<(&str, &str)> {
        let mut current: &(dyn StdError + 'static) = self;
        loop {
            if let Some(Self::DependencyMissing { bean, dependency }) =
                current.downcast_ref::<Self>()
            {
                return Some((bean.as_str(), dependency.as_str()));
            }
            current = current.source()?;
        }
    }

    /// 创建失败链上的组件名称，由外向内
    pub fn creation_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current: Option<&(dyn StdError + 'static)> = Some(self);
        while let Some(error) = current {
            if let Some(Self::BeanCreation { bean, .. }) = error.downcast_ref::<Self>() {
                chain.push(bean.as_str());
            }
            current = error.source();
        }
        chain
    }

    /// 是否为组件未注册错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BeanNotFound { .. })
    }
}

/// 通过可调用接口执行操作时的错误
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("未知操作: {type_name}.{operation}")]
    UnknownOperation { type_name: String, operation: String },

    #[error("操作 {operation} 参数无效: {message}")]
    InvalidArgument { operation: String, message: String },

    #[error("操作 {operation} 执行失败: {message}")]
    Failed { operation: String, message: String },

    #[error("通知执行失败: {aspect}.{advice} ({kind}), 原因: {message}")]
    Advice {
        aspect: String,
        advice: String,
        kind: String,
        message: String,
    },

    #[error("组件 {target} 声明了重名操作: {operation}")]
    DuplicateOperation { target: String, operation: String },

    #[error("{primary} (另有 {} 个附加错误)", .secondary.len())]
    Suppressed {
        #[source]
        primary: Box<InvocationError>,
        secondary: Vec<InvocationError>,
    },
}

impl InvocationError {
    /// 创建操作执行失败错误
    pub fn failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// 创建参数无效错误
    pub fn invalid_argument(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// 创建未知操作错误
    pub fn unknown_operation(type_name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnknownOperation {
            type_name: type_name.into(),
            operation: operation.into(),
        }
    }

    /// 附加次要错误；主错误保持不变
    pub fn with_suppressed(self, mut secondary: Vec<InvocationError>) -> Self {
        if secondary.is_empty() {
            return self;
        }
        match self {
            Self::Suppressed {
                primary,
                secondary: mut existing,
            } => {
                existing.append(&mut secondary);
                Self::Suppressed {
                    primary,
                    secondary: existing,
                }
            }
            primary => Self::Suppressed {
                primary: Box::new(primary),
                secondary,
            },
        }
    }

    /// 主错误（忽略附加的次要错误）
    pub fn primary(&self) -> &InvocationError {
        match self {
            Self::Suppressed { primary, .. } => primary.primary(),
            other => other,
        }
    }

    /// 附加的次要错误
    pub fn suppressed(&self) -> &[InvocationError] {
        match self {
            Self::Suppressed { secondary, .. } => secondary,
            _ => &[],
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    Configuration {
        #[from]
        source: ConfigurationError,
    },

    #[error("依赖注入错误: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },

    #[error("基础设施关闭失败: {message}")]
    ShutdownFailed { message: String },

    #[error("容器状态无效: 期望 {expected}, 实际 {actual}")]
    InvalidState { expected: String, actual: String },
}

/// 配置操作结果类型
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// 依赖注入结果类型
pub type DependencyResult<T> = Result<T, DependencyError>;

/// 调用结果类型
pub type InvocationResult<T> = Result<T, InvocationError>;

/// 基础设施结果类型
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_found_through_chain() {
        let error = DependencyError::creation(
            "userService",
            CreationStage::Wire,
            DependencyError::creation(
                "orderService",
                CreationStage::Wire,
                DependencyError::DependencyMissing {
                    bean: "orderService".to_string(),
                    dependency: "paymentGateway".to_string(),
                },
            ),
        );

        assert_eq!(
            error.missing_dependency(),
            Some(("orderService", "paymentGateway"))
        );
        assert_eq!(error.creation_chain(), vec!["userService", "orderService"]);
    }

    #[test]
    fn test_suppressed_keeps_primary() {
        let error = InvocationError::failed("deleteUser", "用户名不能为空").with_suppressed(vec![
            InvocationError::failed("after", "日志写入失败"),
        ]);

        assert!(matches!(error.primary(), InvocationError::Failed { operation, .. } if operation == "deleteUser"));
        assert_eq!(error.suppressed().len(), 1);

        let unchanged = InvocationError::failed("createUser", "x").with_suppressed(Vec::new());
        assert!(unchanged.suppressed().is_empty());
    }
}
