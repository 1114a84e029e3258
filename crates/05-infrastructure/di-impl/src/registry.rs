//! 组件注册表实现

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use di_abstractions::{
    BeanPostProcessor, ComponentDefinition, ComponentDescriptor, ComponentDiscovery,
    ComponentRegistry,
};
use infrastructure_common::{ConfigurationError, NamingConventions};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// 扫描结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// 注册的普通组件数
    pub components: usize,
    /// 其中的切面数
    pub aspects: usize,
    /// 实例化的后置处理器数
    pub post_processors: usize,
}

impl ScanReport {
    /// 合并另一次扫描的结果
    pub fn merge(&mut self, other: &ScanReport) {
        self.components += other.components;
        self.aspects += other.aspects;
        self.post_processors += other.post_processors;
    }
}

/// 组件注册表实现
///
/// 名称在普通组件与后置处理器之间全局唯一。
pub struct ComponentRegistryImpl {
    /// 组件名称 -> 组件描述
    descriptors: DashMap<String, Arc<ComponentDescriptor>>,
    /// 全部已占用名称 -> 类型全名
    reserved: DashMap<String, String>,
    /// 普通组件的注册顺序
    order: RwLock<Vec<String>>,
    /// 已实例化的后置处理器，按注册顺序
    processors: RwLock<Vec<(String, Arc<dyn BeanPostProcessor>)>>,
}

impl ComponentRegistryImpl {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            descriptors: DashMap::new(),
            reserved: DashMap::new(),
            order: RwLock::new(Vec::new()),
            processors: RwLock::new(Vec::new()),
        }
    }

    /// 扫描命名空间并注册发现的全部组件
    ///
    /// 名称冲突在注册任何组件之前整体检查。
    pub fn scan(
        &self,
        discovery: &dyn ComponentDiscovery,
        namespace: &str,
    ) -> Result<ScanReport, ConfigurationError> {
        let definitions = discovery.discover(namespace)?;
        debug!(
            "发现器 {} 在命名空间 '{}' 下发现 {} 个组件定义",
            discovery.name(),
            namespace,
            definitions.len()
        );

        let mut batch: HashMap<String, String> = HashMap::new();
        for definition in &definitions {
            let name = NamingConventions::derive_bean_name(
                definition.explicit_name(),
                definition.type_info(),
            )?;
            let type_name = definition.type_info().full_path.clone();
            let first = self
                .reserved
                .get(&name)
                .map(|existing| existing.value().clone())
                .or_else(|| batch.get(&name).cloned());
            if let Some(first) = first {
                return Err(ConfigurationError::DuplicateName {
                    name,
                    first,
                    second: type_name,
                });
            }
            batch.insert(name, type_name);
        }

        let mut report = ScanReport::default();
        for definition in definitions {
            let is_processor = definition.is_post_processor();
            let is_aspect = definition.is_aspect();
            self.register(definition)?;
            if is_processor {
                report.post_processors += 1;
            } else {
                report.components += 1;
                if is_aspect {
                    report.aspects += 1;
                }
            }
        }

        info!(
            "组件扫描完成: 命名空间 '{}', 组件 {} 个 (切面 {} 个), 后置处理器 {} 个",
            namespace, report.components, report.aspects, report.post_processors
        );
        Ok(report)
    }

    fn reserve(&self, name: &str, definition: &ComponentDefinition) -> Result<(), ConfigurationError> {
        match self.reserved.entry(name.to_string()) {
            Entry::Occupied(existing) => Err(ConfigurationError::DuplicateName {
                name: name.to_string(),
                first: existing.get().clone(),
                second: definition.type_info().full_path.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(definition.type_info().full_path.clone());
                Ok(())
            }
        }
    }

    /// 后置处理器名称，按注册顺序
    pub fn post_processor_names(&self) -> Vec<String> {
        self.processors
            .read()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Default for ComponentRegistryImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry for ComponentRegistryImpl {
    fn register(&self, definition: ComponentDefinition) -> Result<String, ConfigurationError> {
        let name = NamingConventions::derive_bean_name(
            definition.explicit_name(),
            definition.type_info(),
        )?;
        self.reserve(&name, &definition)?;

        if let Some(created) = definition.instantiate_processor() {
            let processor = match created {
                Ok(processor) => processor,
                Err(source) => {
                    self.reserved.remove(&name);
                    return Err(ConfigurationError::ProcessorInstantiation { name, source });
                }
            };
            info!("注册后置处理器: {} ({})", name, processor.name());
            self.processors.write().push((name.clone(), processor));
            return Ok(name);
        }

        let mut order = self.order.write();
        info!(
            "注册组件: {} ({})",
            name,
            definition.type_info().full_path
        );
        let descriptor = Arc::new(ComponentDescriptor::new(name.clone(), order.len(), definition));
        self.descriptors.insert(name.clone(), descriptor);
        order.push(name.clone());
        Ok(name)
    }

    fn descriptor(&self, name: &str) -> Option<Arc<ComponentDescriptor>> {
        self.descriptors.get(name).map(|entry| entry.value().clone())
    }

    fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    fn names(&self) -> Vec<String> {
        self.order.read().clone()
    }

    fn aspects(&self) -> Vec<Arc<ComponentDescriptor>> {
        self.order
            .read()
            .iter()
            .filter_map(|name| self.descriptor(name))
            .filter(|descriptor| descriptor.definition.is_aspect())
            .collect()
    }

    fn post_processors(&self) -> Vec<Arc<dyn BeanPostProcessor>> {
        self.processors
            .read()
            .iter()
            .map(|(_, processor)| processor.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.descriptors.len()
    }
}
