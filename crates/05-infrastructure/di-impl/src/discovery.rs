//! 组件发现实现
//!
//! - [`StaticDiscovery`]：显式列出的组件定义
//! - [`InventoryDiscovery`]：通过 `inventory::submit!` 在链接期登记的组件定义

use di_abstractions::{registered_definitions, ComponentDefinition, ComponentDiscovery, ComponentType};
use infrastructure_common::{ConfigurationError, NamingConventions};

fn within_namespace(
    definitions: impl IntoIterator<Item = ComponentDefinition>,
    namespace: &str,
) -> Vec<ComponentDefinition> {
    definitions
        .into_iter()
        .filter(|definition| NamingConventions::in_namespace(definition.type_info(), namespace))
        .collect()
}

/// 显式列出组件定义的发现器
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    definitions: Vec<ComponentDefinition>,
}

impl StaticDiscovery {
    /// 创建空发现器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加组件类型
    pub fn with<T: ComponentType>(mut self) -> Self {
        self.definitions.push(T::definition());
        self
    }

    /// 添加组件定义
    pub fn with_definition(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 添加组件定义
    pub fn add(&mut self, definition: ComponentDefinition) {
        self.definitions.push(definition);
    }

    /// 定义数量
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl ComponentDiscovery for StaticDiscovery {
    fn discover(&self, namespace: &str) -> Result<Vec<ComponentDefinition>, ConfigurationError> {
        Ok(within_namespace(self.definitions.iter().cloned(), namespace))
    }

    fn name(&self) -> &str {
        "StaticDiscovery"
    }
}

/// 链接期登记的发现器
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryDiscovery;

impl ComponentDiscovery for InventoryDiscovery {
    fn discover(&self, namespace: &str) -> Result<Vec<ComponentDefinition>, ConfigurationError> {
        // 链接顺序不稳定，按类型全名排序保证注册顺序可复现
        let mut definitions = within_namespace(registered_definitions(), namespace);
        definitions.sort_by(|left, right| left.type_info().full_path.cmp(&right.type_info().full_path));
        Ok(definitions)
    }

    fn name(&self) -> &str {
        "InventoryDiscovery"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod app {
        pub mod service {
            #[derive(Default)]
            pub struct UserService;
        }

        pub mod repository {
            #[derive(Default)]
            pub struct UserRepository;
        }
    }

    #[test]
    fn test_static_discovery_filters_by_namespace() {
        let discovery = StaticDiscovery::new()
            .with_definition(ComponentDefinition::of::<app::service::UserService>())
            .with_definition(ComponentDefinition::of::<app::repository::UserRepository>());

        let root = module_path!().replace("::", ".");
        let all = discovery.discover(&format!("{}.app", root)).expect("discover");
        let services = discovery
            .discover(&format!("{}.app.service", root))
            .expect("discover");
        let none = discovery.discover("elsewhere").expect("discover");

        assert_eq!(all.len(), 2);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].type_info().name, "UserService");
        assert!(none.is_empty());
    }
}
