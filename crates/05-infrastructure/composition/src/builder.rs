//! 应用上下文构建器

use crate::context::ApplicationContext;
use crate::logging::LoggingConfig;
use crate::settings::ContextSettings;
use di_abstractions::{BeanPostProcessor, ComponentDiscovery, ContainerConfig};
use di_impl::InventoryDiscovery;
use infrastructure_common::{BeanRef, InfrastructureError};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 应用上下文构建器
///
/// 使用建造者模式组装上下文；未添加任何发现器时使用链接期登记的组件。
pub struct ApplicationContextBuilder {
    /// 上下文配置
    settings: ContextSettings,
    /// 组件发现器
    discoveries: Vec<Box<dyn ComponentDiscovery>>,
    /// 额外的后置处理器，先于扫描得到的处理器执行
    post_processors: Vec<Arc<dyn BeanPostProcessor>>,
    /// 外部创建的单例
    singletons: Vec<(String, BeanRef)>,
    /// 是否初始化日志
    logging_enabled: bool,
}

impl ApplicationContextBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            settings: ContextSettings::default(),
            discoveries: Vec::new(),
            post_processors: Vec::new(),
            singletons: Vec::new(),
            logging_enabled: false,
        }
    }

    /// 使用给定配置
    pub fn with_settings(mut self, settings: ContextSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 从配置文件与环境变量加载配置
    pub fn load_settings<P: AsRef<Path>>(mut self, path: Option<P>) -> Result<Self, InfrastructureError> {
        let path: Option<&Path> = path.as_ref().map(|path| path.as_ref());
        self.settings = ContextSettings::load(path)?;
        Ok(self)
    }

    /// 设置根命名空间
    pub fn root_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.settings.root_namespace = namespace.into();
        self
    }

    /// 设置容器配置
    pub fn container_config(mut self, config: ContainerConfig) -> Self {
        self.settings.container = config;
        self
    }

    /// 添加组件发现器
    pub fn with_discovery<D: ComponentDiscovery + 'static>(mut self, discovery: D) -> Self {
        debug!("添加组件发现器: {}", discovery.name());
        self.discoveries.push(Box::new(discovery));
        self
    }

    /// 添加后置处理器
    pub fn with_post_processor(mut self, processor: Arc<dyn BeanPostProcessor>) -> Self {
        debug!("添加后置处理器: {}", processor.name());
        self.post_processors.push(processor);
        self
    }

    /// 注册外部创建的单例
    pub fn with_singleton(mut self, name: impl Into<String>, bean: BeanRef) -> Self {
        self.singletons.push((name.into(), bean));
        self
    }

    /// 配置并启用日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.settings.logging = config;
        self.logging_enabled = true;
        self
    }

    /// 按已加载配置中的日志设置初始化日志
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// 构建上下文，状态为 `Created`
    pub fn build(self) -> Result<ApplicationContext, InfrastructureError> {
        if self.logging_enabled {
            self.settings.logging.try_init()?;
        }

        let mut discoveries = self.discoveries;
        if discoveries.is_empty() {
            discoveries.push(Box::new(InventoryDiscovery));
        }

        let context = ApplicationContext::new(self.settings, discoveries, self.post_processors);
        for (name, bean) in self.singletons {
            context.register_singleton(&name, bean)?;
        }

        info!("应用上下文已创建: {}", context.id());
        Ok(context)
    }

    /// 构建并启动上下文
    pub fn start(self) -> Result<ApplicationContext, InfrastructureError> {
        let context = self.build()?;
        context.start()?;
        Ok(context)
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
