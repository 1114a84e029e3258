//! 组件注册表抽象接口

use crate::factory::ComponentDefinition;
use crate::post_processor::BeanPostProcessor;
use infrastructure_common::ConfigurationError;
use std::sync::Arc;

/// 已注册的组件：名称、扫描顺序和定义
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// 组件名称
    pub name: String,
    /// 注册顺序
    pub index: usize,
    /// 组件定义
    pub definition: ComponentDefinition,
}

impl ComponentDescriptor {
    /// 创建组件描述
    pub fn new(name: impl Into<String>, index: usize, definition: ComponentDefinition) -> Self {
        Self {
            name: name.into(),
            index,
            definition,
        }
    }
}

/// 组件注册表 trait
///
/// 名称到组件定义的映射。后置处理器在注册时即被实例化，不作为普通组件解析。
pub trait ComponentRegistry: Send + Sync {
    /// 注册单个组件定义，返回其名称
    fn register(&self, definition: ComponentDefinition) -> Result<String, ConfigurationError>;

    /// 按名称查找组件描述
    fn descriptor(&self, name: &str) -> Option<Arc<ComponentDescriptor>>;

    /// 是否已注册为普通组件
    fn contains(&self, name: &str) -> bool;

    /// 普通组件名称，按注册顺序
    fn names(&self) -> Vec<String>;

    /// 切面组件描述，按注册顺序
    fn aspects(&self) -> Vec<Arc<ComponentDescriptor>>;

    /// 已实例化的后置处理器，按注册顺序
    fn post_processors(&self) -> Vec<Arc<dyn BeanPostProcessor>>;

    /// 普通组件数量
    fn len(&self) -> usize;

    /// 是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
