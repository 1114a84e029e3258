//! 组件解析器抽象接口
//!
//! 按名称解析组件，并提供按具体类型或接口面取出的便捷方法

use infrastructure_common::{BeanRef, DependencyError, Invocable};
use std::any::Any;
use std::sync::Arc;

/// 组件解析器 trait
pub trait BeanResolver: Send + Sync {
    /// 按名称解析组件，必要时创建
    fn get_bean(&self, name: &str) -> Result<BeanRef, DependencyError>;

    /// 是否存在该名称的组件
    fn contains_bean(&self, name: &str) -> bool;

    /// 按接口面解析组件
    fn get_invocable(&self, name: &str) -> Result<Arc<dyn Invocable>, DependencyError> {
        self.get_bean(name)?
            .as_invocable()
            .ok_or_else(|| DependencyError::NotInvocable {
                name: name.to_string(),
            })
    }

    /// 按具体类型解析组件
    fn get_bean_typed<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, DependencyError>
    where
        Self: Sized,
    {
        let bean = self.get_bean(name)?;
        bean.downcast::<T>()
            .ok_or_else(|| DependencyError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }
}
