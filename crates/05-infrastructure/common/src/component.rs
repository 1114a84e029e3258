//! 组件实例句柄

use crate::errors::InvocationError;
use crate::invocation::Invocable;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的组件实例
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

/// 组件实例句柄
///
/// 同时持有具体实例和（可选的）可调用接口面。代理化的组件共享原始实例，
/// 但接口面指向代理，因此按接口访问会经过拦截链，按具体类型访问则不会。
#[derive(Clone)]
pub struct BeanRef {
    instance: AnyInstance,
    invocable: Option<Arc<dyn Invocable>>,
    type_name: &'static str,
    advised: bool,
}

impl BeanRef {
    /// 包装只暴露具体类型的实例
    pub fn new<T: Any + Send + Sync>(instance: Arc<T>) -> Self {
        Self {
            instance,
            invocable: None,
            type_name: std::any::type_name::<T>(),
            advised: false,
        }
    }

    /// 包装同时暴露可调用接口的实例
    pub fn with_interface<T: Invocable + Any>(instance: Arc<T>) -> Self {
        let invocable: Arc<dyn Invocable> = instance.clone();
        Self {
            instance,
            invocable: Some(invocable),
            type_name: std::any::type_name::<T>(),
            advised: false,
        }
    }

    /// 以代理替换接口面，具体实例保持不变
    pub fn advised(target: &BeanRef, proxy: Arc<dyn Invocable>) -> Self {
        Self {
            instance: target.instance.clone(),
            invocable: Some(proxy),
            type_name: target.type_name,
            advised: true,
        }
    }

    /// 按具体类型取出实例
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.instance.clone().downcast::<T>().ok()
    }

    /// 按具体类型借用实例
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }

    /// 可调用接口面；代理化组件返回代理
    pub fn as_invocable(&self) -> Option<Arc<dyn Invocable>> {
        self.invocable.clone()
    }

    /// 是否暴露可调用接口
    pub fn is_invocable(&self) -> bool {
        self.invocable.is_some()
    }

    /// 接口面是否已被代理替换
    pub fn is_advised(&self) -> bool {
        self.advised
    }

    /// 具体实例的类型名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 通过接口面调用操作
    pub fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvocationError> {
        match &self.invocable {
            Some(invocable) => invocable.invoke(operation, args),
            None => Err(InvocationError::unknown_operation(self.type_name, operation)),
        }
    }

    /// 引用身份比较：具体实例和接口面都相同才视为同一句柄
    pub fn ptr_eq(&self, other: &BeanRef) -> bool {
        let same_instance =
            Arc::as_ptr(&self.instance).cast::<()>() == Arc::as_ptr(&other.instance).cast::<()>();
        let same_surface = match (&self.invocable, &other.invocable) {
            (Some(left), Some(right)) => {
                Arc::as_ptr(left).cast::<()>() == Arc::as_ptr(right).cast::<()>()
            }
            (None, None) => true,
            _ => false,
        };
        same_instance && same_surface
    }
}

impl fmt::Debug for BeanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanRef")
            .field("type_name", &self.type_name)
            .field("invocable", &self.invocable.is_some())
            .field("advised", &self.advised)
            .finish()
    }
}
