//! 依赖注入槽位
//!
//! 组件以 [`Autowired`] 字段声明依赖，容器在创建时按名称解析并写入。
//! 槽位只写一次，因此循环依赖中的早期引用也能安全写入。

use crate::container::ConcreteProxyPolicy;
use infrastructure_common::{BeanRef, Invocable};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// 注入失败的原因
#[derive(Error, Debug)]
pub enum InjectionError {
    #[error("注入目标类型不匹配: 字段 {field} 需要宿主类型 {expected}")]
    TargetMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("依赖类型不匹配: 字段 {field} 需要 {expected}, 但组件 {dependency} 不满足")]
    DependencyMismatch {
        field: &'static str,
        dependency: String,
        expected: String,
    },

    #[error("组件 {dependency} 已被代理, 不能注入到具体类型字段 {field}")]
    ConcreteProxy {
        field: &'static str,
        dependency: String,
    },

    #[error("字段 {field} 已经注入过")]
    AlreadyInjected { field: &'static str },
}

/// 可以从组件句柄中取出的类型
///
/// 具体类型按 `downcast` 取出实例；`dyn Invocable` 取出接口面（可能是代理）。
pub trait FromBean: Send + Sync + 'static {
    /// 从句柄中取出
    fn from_bean(bean: &BeanRef) -> Option<Arc<Self>>;

    /// 期望类型的描述，用于错误信息
    fn expected() -> String;

    /// 是否按接口面访问
    fn is_interface() -> bool {
        false
    }
}

impl<T: Any + Send + Sync> FromBean for T {
    fn from_bean(bean: &BeanRef) -> Option<Arc<Self>> {
        bean.downcast::<T>()
    }

    fn expected() -> String {
        std::any::type_name::<T>().to_string()
    }
}

impl FromBean for dyn Invocable {
    fn from_bean(bean: &BeanRef) -> Option<Arc<Self>> {
        bean.as_invocable()
    }

    fn expected() -> String {
        "dyn Invocable".to_string()
    }

    fn is_interface() -> bool {
        true
    }
}

/// 自动注入的依赖槽位
///
/// 槽位一经写入便持有依赖的强引用，直到所属组件被释放。互相注入的组件因此
/// 构成引用环，容器关闭后也不会被释放。
pub struct Autowired<T: ?Sized> {
    slot: OnceLock<Arc<T>>,
}

impl<T: ?Sized> Autowired<T> {
    /// 创建空槽位
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// 已注入的依赖
    pub fn get(&self) -> Option<&Arc<T>> {
        self.slot.get()
    }

    /// 是否已注入
    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }

    /// 写入依赖；已写入时原样返回
    pub fn inject(&self, value: Arc<T>) -> Result<(), Arc<T>> {
        self.slot.set(value)
    }
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Autowired<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            f.write_str("Autowired(set)")
        } else {
            f.write_str("Autowired(unset)")
        }
    }
}

type Injector = Arc<
    dyn Fn(&BeanRef, &BeanRef, ConcreteProxyPolicy) -> Result<(), InjectionError> + Send + Sync,
>;

/// 依赖描述：依赖名称、是否必需，以及写入宿主字段的方式
#[derive(Clone)]
pub struct DependencyDescriptor {
    name: String,
    field: &'static str,
    required: bool,
    interface: bool,
    injector: Injector,
}

impl DependencyDescriptor {
    /// 描述宿主 `C` 的一个 [`Autowired`] 字段
    pub fn field<C, D>(
        name: impl Into<String>,
        field: &'static str,
        accessor: fn(&C) -> &Autowired<D>,
    ) -> Self
    where
        C: Any + Send + Sync,
        D: ?Sized + FromBean,
    {
        let name = name.into();
        let dependency_name = name.clone();
        let injector: Injector = Arc::new(
            move |target: &BeanRef, dependency: &BeanRef, policy: ConcreteProxyPolicy| {
                let host = target
                    .downcast_ref::<C>()
                    .ok_or(InjectionError::TargetMismatch {
                        field,
                        expected: std::any::type_name::<C>(),
                    })?;

                if dependency.is_advised()
                    && !D::is_interface()
                    && policy == ConcreteProxyPolicy::Reject
                {
                    return Err(InjectionError::ConcreteProxy {
                        field,
                        dependency: dependency_name.clone(),
                    });
                }

                let value = D::from_bean(dependency).ok_or_else(|| {
                    InjectionError::DependencyMismatch {
                        field,
                        dependency: dependency_name.clone(),
                        expected: D::expected(),
                    }
                })?;

                accessor(host)
                    .inject(value)
                    .map_err(|_| InjectionError::AlreadyInjected { field })
            },
        );

        Self {
            name,
            field,
            required: true,
            interface: D::is_interface(),
            injector,
        }
    }

    /// 标记为可选依赖：未注册时跳过注入
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// 设置是否必需
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// 依赖的组件名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 宿主字段名
    pub fn field_name(&self) -> &'static str {
        self.field
    }

    /// 是否必需
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// 是否按接口面注入
    pub fn is_interface(&self) -> bool {
        self.interface
    }

    /// 把依赖写入宿主
    pub fn inject(
        &self,
        target: &BeanRef,
        dependency: &BeanRef,
        policy: ConcreteProxyPolicy,
    ) -> Result<(), InjectionError> {
        (self.injector)(target, dependency, policy)
    }
}

impl fmt::Debug for DependencyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyDescriptor")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("required", &self.required)
            .field("interface", &self.interface)
            .finish()
    }
}
