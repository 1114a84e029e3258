//! 应用上下文
//!
//! 上下文由启动它的一方持有，生命周期为：
//! `Created` → [`scan`](ApplicationContext::scan) → `Scanned` →
//! [`refresh`](ApplicationContext::refresh) → `Ready` → [`close`](ApplicationContext::close) → `Closed`。
//! 扫描或刷新失败时进入 `Failed`，已创建的单例会被销毁。

use crate::builder::ApplicationContextBuilder;
use crate::settings::ContextSettings;
use aop_impl::{AopPostProcessor, AspectRegistry, Pointcut};
use chrono::{DateTime, Utc};
use di_abstractions::{
    BeanPostProcessor, BeanResolver, ComponentDiscovery, ComponentRegistry, ContainerStats,
};
use di_impl::{ComponentRegistryImpl, DefaultBeanFactory, PostProcessorPipeline, ScanReport};
use infrastructure_common::{
    BeanRef, ContextState, DependencyError, InfrastructureError, InfrastructureResult, Invocable,
};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 应用上下文
pub struct ApplicationContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    settings: ContextSettings,
    state: RwLock<ContextState>,
    ready_at: RwLock<Option<DateTime<Utc>>>,
    discoveries: Vec<Box<dyn ComponentDiscovery>>,
    registry: Arc<ComponentRegistryImpl>,
    pipeline: Arc<PostProcessorPipeline>,
    factory: DefaultBeanFactory,
    aop: RwLock<Option<Arc<AopPostProcessor>>>,
    scan_report: RwLock<ScanReport>,
}

impl ApplicationContext {
    /// 创建上下文构建器
    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    /// 以链接期登记的组件创建并启动上下文
    pub fn run(root_namespace: impl Into<String>) -> InfrastructureResult<Self> {
        Self::builder().root_namespace(root_namespace).start()
    }

    pub(crate) fn new(
        settings: ContextSettings,
        discoveries: Vec<Box<dyn ComponentDiscovery>>,
        post_processors: Vec<Arc<dyn BeanPostProcessor>>,
    ) -> Self {
        let registry = Arc::new(ComponentRegistryImpl::new());
        let pipeline = Arc::new(PostProcessorPipeline::new());
        for processor in post_processors {
            pipeline.add(processor);
        }
        let factory =
            DefaultBeanFactory::new(registry.clone(), pipeline.clone(), settings.container.clone());

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            settings,
            state: RwLock::new(ContextState::Created),
            ready_at: RwLock::new(None),
            discoveries,
            registry,
            pipeline,
            factory,
            aop: RwLock::new(None),
            scan_report: RwLock::new(ScanReport::default()),
        }
    }

    /// 上下文标识
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 进入就绪状态的时间
    pub fn ready_at(&self) -> Option<DateTime<Utc>> {
        *self.ready_at.read()
    }

    /// 当前状态
    pub fn state(&self) -> ContextState {
        *self.state.read()
    }

    /// 上下文配置
    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    /// 扫描结果
    pub fn scan_report(&self) -> ScanReport {
        self.scan_report.read().clone()
    }

    /// 底层组件工厂
    pub fn bean_factory(&self) -> &DefaultBeanFactory {
        &self.factory
    }

    /// 组件注册表
    pub fn registry(&self) -> &Arc<ComponentRegistryImpl> {
        &self.registry
    }

    fn transition(&self, next: ContextState) -> InfrastructureResult<()> {
        let mut state = self.state.write();
        if !state.can_transition_to(next) {
            return Err(InfrastructureError::InvalidState {
                expected: next.to_string(),
                actual: state.to_string(),
            });
        }
        debug!("上下文 {} 状态: {} -> {}", self.id, *state, next);
        *state = next;
        Ok(())
    }

    fn ensure_ready(&self) -> InfrastructureResult<()> {
        let state = self.state();
        if state != ContextState::Ready {
            return Err(InfrastructureError::InvalidState {
                expected: ContextState::Ready.to_string(),
                actual: state.to_string(),
            });
        }
        Ok(())
    }

    fn fail(&self, error: InfrastructureError) -> InfrastructureError {
        error!("上下文 {} 启动失败: {}", self.id, error);
        for destroy_error in self.factory.destroy_singletons() {
            warn!("回滚时销毁组件失败: {}", destroy_error);
        }
        *self.state.write() = ContextState::Failed;
        error
    }

    /// 注册外部创建的单例
    pub fn register_singleton(&self, name: &str, bean: BeanRef) -> InfrastructureResult<()> {
        let state = self.state();
        if !matches!(state, ContextState::Created | ContextState::Scanned) {
            return Err(InfrastructureError::InvalidState {
                expected: ContextState::Created.to_string(),
                actual: state.to_string(),
            });
        }
        self.factory.register_singleton(name, bean)?;
        Ok(())
    }

    /// 扫描根命名空间，注册组件并安装扫描得到的后置处理器
    ///
    /// 名称冲突和无效切点都在这里暴露，早于任何组件创建。
    pub fn scan(&self) -> InfrastructureResult<ScanReport> {
        self.transition(ContextState::Scanned)?;
        match self.do_scan() {
            Ok(report) => {
                *self.scan_report.write() = report.clone();
                Ok(report)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    fn do_scan(&self) -> InfrastructureResult<ScanReport> {
        let namespace = self.settings.root_namespace.as_str();
        info!("开始扫描组件: 命名空间 '{}'", namespace);

        let mut report = ScanReport::default();
        for discovery in &self.discoveries {
            let scanned = self.registry.scan(discovery.as_ref(), namespace)?;
            report.merge(&scanned);
        }

        for descriptor in self.registry.aspects() {
            let Some(aspect) = descriptor.definition.aspect_definition() else {
                continue;
            };
            for advice in aspect.advices() {
                Pointcut::parse(advice.pointcut())?;
            }
        }

        for processor in self.registry.post_processors() {
            self.pipeline.add(processor);
        }
        Ok(report)
    }

    /// 绑定切面、安装自动代理并创建全部单例
    pub fn refresh(&self) -> InfrastructureResult<()> {
        self.transition(ContextState::Refreshing)?;
        if let Err(error) = self.do_refresh() {
            return Err(self.fail(error));
        }
        self.transition(ContextState::Ready)?;
        *self.ready_at.write() = Some(Utc::now());

        let stats = self.stats();
        info!(
            "上下文 {} 就绪: 组件 {} 个, 单例 {} 个, 代理 {} 个",
            self.id, stats.registered_components, stats.active_singletons, stats.proxies_created
        );
        Ok(())
    }

    fn do_refresh(&self) -> InfrastructureResult<()> {
        let config = &self.settings.container;

        // 切面先于自动代理创建，自身不会被代理
        let aspects = self.bind_aspects()?;
        if config.enable_aop && !aspects.is_empty() {
            let processor = Arc::new(AopPostProcessor::new(Arc::new(aspects)));
            self.pipeline.add(processor.clone());
            *self.aop.write() = Some(processor);
            info!("已启用拦截层");
        } else if !aspects.is_empty() {
            info!("拦截层已禁用, 忽略 {} 条通知", aspects.bindings().len());
        }

        if config.eager_init {
            let created = self.factory.preinstantiate_singletons()?;
            debug!("预创建单例 {} 个", created);
        }
        Ok(())
    }

    fn bind_aspects(&self) -> InfrastructureResult<AspectRegistry> {
        let mut aspects = AspectRegistry::new();
        for descriptor in self.registry.aspects() {
            let Some(definition) = descriptor.definition.aspect_definition() else {
                continue;
            };
            let bean = self.factory.resolve(&descriptor.name)?;
            aspects.register(&descriptor.name, &bean, definition)?;
        }
        Ok(aspects)
    }

    /// 扫描并刷新
    pub fn start(&self) -> InfrastructureResult<()> {
        self.scan()?;
        self.refresh()
    }

    /// 按名称获取组件
    pub fn get_bean(&self, name: &str) -> InfrastructureResult<BeanRef> {
        self.ensure_ready()?;
        Ok(self.factory.resolve(name)?)
    }

    /// 按具体类型获取组件
    pub fn get_bean_typed<T: Any + Send + Sync>(&self, name: &str) -> InfrastructureResult<Arc<T>> {
        self.ensure_ready()?;
        Ok(self.factory.get_bean_typed::<T>(name)?)
    }

    /// 获取组件的可调用接口面；已代理的组件返回代理
    pub fn get_invocable(&self, name: &str) -> InfrastructureResult<Arc<dyn Invocable>> {
        self.ensure_ready()?;
        Ok(self.factory.get_invocable(name)?)
    }

    /// 是否包含指定组件
    pub fn contains_bean(&self, name: &str) -> bool {
        self.factory.contains_bean(name)
    }

    /// 全部组件名称：先是扫描注册的组件，再是外部单例
    pub fn bean_names(&self) -> Vec<String> {
        let mut names = self.registry.names();
        for name in self.factory.singleton_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// 组件是否正在创建
    pub fn is_singleton_in_creation(&self, name: &str) -> bool {
        self.factory.is_singleton_in_creation(name)
    }

    /// 统计信息
    pub fn stats(&self) -> ContainerStats {
        let mut stats = self.factory.stats();
        if let Some(aop) = self.aop.read().as_ref() {
            stats.proxies_created = aop.proxies_created();
        }
        stats
    }

    /// 关闭上下文：按创建顺序的逆序执行销毁回调并清空缓存
    ///
    /// 重复关闭不做任何事。销毁回调的失败会被汇总返回，但上下文仍然进入 `Closed`。
    ///
    /// 关闭只释放容器持有的引用。循环依赖的组件通过注入槽位互相持有强引用，
    /// 关闭后不会被回收；需要释放外部资源的组件应在销毁回调中完成。
    pub fn close(&self) -> InfrastructureResult<()> {
        {
            let mut state = self.state.write();
            if *state == ContextState::Closed {
                return Ok(());
            }
            *state = ContextState::Closed;
        }

        info!("关闭上下文: {}", self.id);
        let errors: Vec<DependencyError> = self.factory.destroy_singletons();

        if errors.is_empty() {
            return Ok(());
        }
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(InfrastructureError::ShutdownFailed { message })
    }

    /// 运行时长
    pub fn uptime(&self) -> Option<chrono::Duration> {
        self.ready_at().map(|ready| Utc::now() - ready)
    }
}
