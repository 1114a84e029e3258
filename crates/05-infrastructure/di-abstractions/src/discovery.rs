//! 组件发现抽象接口
//!
//! 提供按命名空间发现组件定义的能力

use crate::factory::{ComponentDefinition, ComponentType};
use infrastructure_common::ConfigurationError;

/// 组件发现器 trait
///
/// 返回根命名空间（含子命名空间）下的全部组件定义，顺序即注册顺序。
pub trait ComponentDiscovery: Send + Sync {
    /// 发现组件
    fn discover(&self, namespace: &str) -> Result<Vec<ComponentDefinition>, ConfigurationError>;

    /// 获取发现器名称
    fn name(&self) -> &str;
}

/// 链接期组件登记项
///
/// 通过 `inventory::submit!` 提交，由链接期发现器统一收集：
///
/// ```ignore
/// inventory::submit! {
///     ComponentRegistration::of::<UserService>()
/// }
/// ```
pub struct ComponentRegistration {
    build: fn() -> ComponentDefinition,
}

impl ComponentRegistration {
    /// 以定义函数创建登记项
    pub const fn new(build: fn() -> ComponentDefinition) -> Self {
        Self { build }
    }

    /// 以 [`ComponentType`] 创建登记项
    pub const fn of<T: ComponentType>() -> Self {
        Self {
            build: T::definition,
        }
    }

    /// 生成组件定义
    pub fn definition(&self) -> ComponentDefinition {
        (self.build)()
    }
}

inventory::collect!(ComponentRegistration);

/// 链接期登记的全部组件定义
pub fn registered_definitions() -> Vec<ComponentDefinition> {
    inventory::iter::<ComponentRegistration>
        .into_iter()
        .map(ComponentRegistration::definition)
        .collect()
}
