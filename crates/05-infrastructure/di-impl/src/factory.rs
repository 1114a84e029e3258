//! 单例组件工厂
//!
//! 三级缓存解决循环依赖：
//!
//! 1. `singleton_objects`：完全初始化的单例
//! 2. `early_singleton_objects`：已提前暴露、尚未完成初始化的引用
//! 3. `singleton_factories`：按需产出早期引用的工厂
//!
//! 同一名称任一时刻至多出现在一级缓存中；创建标记在组件创建期间存在，
//! 无论成功失败都会在离开创建流程时移除。

use crate::pipeline::PostProcessorPipeline;
use crate::registry::ComponentRegistryImpl;
use dashmap::{DashMap, DashSet};
use di_abstractions::{
    BeanResolver, ComponentDefinition, ComponentDescriptor, ComponentRegistry, ConcreteProxyPolicy,
    ContainerConfig, ContainerStats, ObjectFactory,
};
use infrastructure_common::{
    BeanRef, CleanupGuard, ConfigurationError, CreationStage, DependencyError,
};
use parking_lot::{Mutex, ReentrantMutex};
use std::any::Any;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// 单例当前所处的缓存层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SingletonTier {
    /// 一级：完全初始化
    Finished,
    /// 二级：已提前暴露
    EarlyExposed,
    /// 三级：早期引用工厂
    Factory,
}

#[derive(Default)]
struct FactoryCounters {
    early_references: AtomicU64,
    creation_failures: AtomicU64,
}

/// 默认单例组件工厂
pub struct DefaultBeanFactory {
    registry: Arc<ComponentRegistryImpl>,
    pipeline: Arc<PostProcessorPipeline>,
    config: ContainerConfig,
    /// 一级缓存：完全初始化的单例
    singleton_objects: DashMap<String, BeanRef>,
    /// 二级缓存：提前暴露的早期引用
    early_singleton_objects: DashMap<String, BeanRef>,
    /// 三级缓存：早期引用工厂
    singleton_factories: DashMap<String, ObjectFactory>,
    /// 正在创建中的组件
    singletons_in_creation: DashSet<String>,
    /// 串行化首次创建；同一线程可重入以支持嵌套依赖
    creation_lock: ReentrantMutex<()>,
    creation_depth: AtomicUsize,
    /// 完成顺序
    creation_order: Mutex<Vec<String>>,
    /// 有销毁回调的组件及其原始实例，按完成顺序
    disposables: Mutex<Vec<(String, BeanRef)>>,
    counters: FactoryCounters,
}

impl DefaultBeanFactory {
    /// 创建新的组件工厂
    pub fn new(
        registry: Arc<ComponentRegistryImpl>,
        pipeline: Arc<PostProcessorPipeline>,
        config: ContainerConfig,
    ) -> Self {
        Self {
            registry,
            pipeline,
            config,
            singleton_objects: DashMap::new(),
            early_singleton_objects: DashMap::new(),
            singleton_factories: DashMap::new(),
            singletons_in_creation: DashSet::new(),
            creation_lock: ReentrantMutex::new(()),
            creation_depth: AtomicUsize::new(0),
            creation_order: Mutex::new(Vec::new()),
            disposables: Mutex::new(Vec::new()),
            counters: FactoryCounters::default(),
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 组件注册表
    pub fn registry(&self) -> &Arc<ComponentRegistryImpl> {
        &self.registry
    }

    /// 后置处理器流水线
    pub fn pipeline(&self) -> &Arc<PostProcessorPipeline> {
        &self.pipeline
    }

    /// 按名称解析组件，必要时创建
    pub fn resolve(&self, name: &str) -> Result<BeanRef, DependencyError> {
        if let Some(bean) = self.singleton_objects.get(name) {
            return Ok(bean.value().clone());
        }

        let _lock = self.creation_lock.lock();
        if let Some(bean) = self.get_singleton(name)? {
            return Ok(bean);
        }
        self.create_singleton(name)
    }

    /// 依次查询三级缓存
    fn get_singleton(&self, name: &str) -> Result<Option<BeanRef>, DependencyError> {
        if let Some(bean) = self.singleton_objects.get(name) {
            return Ok(Some(bean.value().clone()));
        }
        if !self.singletons_in_creation.contains(name) {
            return Ok(None);
        }
        if let Some(early) = self.early_singleton_objects.get(name) {
            trace!("命中早期引用: {}", name);
            return Ok(Some(early.value().clone()));
        }

        match self.singleton_factories.remove(name) {
            Some((_, factory)) => {
                let early = factory()?;
                self.early_singleton_objects
                    .insert(name.to_string(), early.clone());
                self.counters.early_references.fetch_add(1, Ordering::Relaxed);
                debug!("循环依赖: 提前暴露组件 {} 的早期引用", name);
                Ok(Some(early))
            }
            None => Err(DependencyError::CurrentlyInCreation {
                name: name.to_string(),
            }),
        }
    }

    fn create_singleton(&self, name: &str) -> Result<BeanRef, DependencyError> {
        let descriptor = self
            .registry
            .descriptor(name)
            .ok_or_else(|| DependencyError::not_found(name))?;

        let depth = self.creation_depth.fetch_add(1, Ordering::SeqCst) + 1;
        let _depth_guard = CleanupGuard::new(|| {
            self.creation_depth.fetch_sub(1, Ordering::SeqCst);
        });
        if depth > self.config.max_creation_depth {
            return Err(DependencyError::CreationDepthExceeded {
                name: name.to_string(),
                limit: self.config.max_creation_depth,
            });
        }

        if !self.singletons_in_creation.insert(name.to_string()) {
            return Err(DependencyError::CurrentlyInCreation {
                name: name.to_string(),
            });
        }
        let _creation_guard = CleanupGuard::new(|| {
            self.singletons_in_creation.remove(name);
        });

        debug!("开始创建组件: {}", name);
        match self.do_create(&descriptor) {
            Ok((bean, raw)) => {
                self.add_singleton(name, bean.clone());
                self.creation_order.lock().push(name.to_string());
                if descriptor.definition.has_destroy() {
                    self.disposables.lock().push((name.to_string(), raw));
                }
                info!("组件创建完成: {} ({})", name, bean.type_name());
                Ok(bean)
            }
            Err(error) => {
                self.singleton_factories.remove(name);
                self.early_singleton_objects.remove(name);
                self.counters.creation_failures.fetch_add(1, Ordering::Relaxed);
                warn!("组件创建失败: {}, 原因: {}", name, error);
                Err(error)
            }
        }
    }

    /// 返回 `(对外暴露的对象, 原始实例)`
    fn do_create(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<(BeanRef, BeanRef), DependencyError> {
        let name = descriptor.name.as_str();
        let definition = &descriptor.definition;

        let raw = definition
            .instantiate()
            .map_err(|source| DependencyError::creation(name, CreationStage::Instantiate, source))?;

        self.add_singleton_factory(name, raw.clone());
        self.populate(name, definition, &raw)?;
        let exposed = self.initialize(name, definition, raw.clone())?;
        let exposed = self.reconcile_early_reference(name, &raw, exposed)?;
        Ok((exposed, raw))
    }

    fn add_singleton_factory(&self, name: &str, raw: BeanRef) {
        let pipeline = self.pipeline.clone();
        let bean_name = name.to_string();
        let factory: ObjectFactory =
            Arc::new(move || pipeline.apply_early_reference(raw.clone(), &bean_name));
        self.singleton_factories.insert(name.to_string(), factory);
        trace!("注册早期引用工厂: {}", name);
    }

    fn add_singleton(&self, name: &str, bean: BeanRef) {
        self.singleton_factories.remove(name);
        self.early_singleton_objects.remove(name);
        self.singleton_objects.insert(name.to_string(), bean);
    }

    /// 依赖注入
    fn populate(
        &self,
        name: &str,
        definition: &ComponentDefinition,
        raw: &BeanRef,
    ) -> Result<(), DependencyError> {
        for dependency in definition.dependencies() {
            let dependency_name = dependency.name();
            if !self.contains_bean(dependency_name) {
                if dependency.is_required() {
                    return Err(DependencyError::creation(
                        name,
                        CreationStage::Wire,
                        DependencyError::DependencyMissing {
                            bean: name.to_string(),
                            dependency: dependency_name.to_string(),
                        },
                    ));
                }
                debug!(
                    "组件 {} 的可选依赖 {} 未注册，跳过注入",
                    name, dependency_name
                );
                continue;
            }

            let target = self
                .resolve(dependency_name)
                .map_err(|source| DependencyError::creation(name, CreationStage::Wire, source))?;

            if target.is_advised()
                && !dependency.is_interface()
                && self.config.concrete_proxy_policy == ConcreteProxyPolicy::PassThrough
            {
                warn!(
                    "组件 {} 的字段 {} 以具体类型注入已代理的组件 {}，通知将被绕过",
                    name,
                    dependency.field_name(),
                    dependency_name
                );
            }

            dependency
                .inject(raw, &target, self.config.concrete_proxy_policy)
                .map_err(|source| DependencyError::creation(name, CreationStage::Wire, source))?;
            trace!("注入依赖: {}.{} <- {}", name, dependency.field_name(), dependency_name);
        }
        Ok(())
    }

    /// 前置处理、初始化回调、后置处理
    fn initialize(
        &self,
        name: &str,
        definition: &ComponentDefinition,
        raw: BeanRef,
    ) -> Result<BeanRef, DependencyError> {
        let bean = self.pipeline.apply_before_initialization(raw.clone(), name)?;
        definition
            .initialize(&raw)
            .map_err(|source| DependencyError::creation(name, CreationStage::Initialize, source))?;
        self.pipeline.apply_after_initialization(bean, name)
    }

    /// 早期引用已被他人持有时，保证最终对象与之一致
    fn reconcile_early_reference(
        &self,
        name: &str,
        raw: &BeanRef,
        exposed: BeanRef,
    ) -> Result<BeanRef, DependencyError> {
        let Some(early) = self
            .early_singleton_objects
            .get(name)
            .map(|entry| entry.value().clone())
        else {
            return Ok(exposed);
        };

        if exposed.ptr_eq(raw) || exposed.ptr_eq(&early) {
            return Ok(early);
        }
        if self.config.allow_raw_injection_despite_wrapping {
            warn!(
                "组件 {} 的早期引用已被注入，但最终对象不同；按配置继续",
                name
            );
            return Ok(exposed);
        }
        Err(DependencyError::RawReferenceExposed {
            name: name.to_string(),
        })
    }

    /// 注册外部创建的单例
    pub fn register_singleton(&self, name: &str, bean: BeanRef) -> Result<(), ConfigurationError> {
        if self.registry.contains(name) || self.singleton_objects.contains_key(name) {
            return Err(ConfigurationError::DuplicateName {
                name: name.to_string(),
                first: name.to_string(),
                second: bean.type_name().to_string(),
            });
        }
        info!("注册外部单例: {} ({})", name, bean.type_name());
        self.singleton_objects.insert(name.to_string(), bean);
        self.creation_order.lock().push(name.to_string());
        Ok(())
    }

    /// 创建全部已注册组件，返回本次新建的数量
    pub fn preinstantiate_singletons(&self) -> Result<usize, DependencyError> {
        let mut created = 0;
        for name in self.registry.names() {
            if self.singleton_objects.contains_key(&name) {
                continue;
            }
            self.resolve(&name)?;
            created += 1;
        }
        debug!("预创建单例完成: {} 个", created);
        Ok(created)
    }

    /// 按完成顺序的逆序调用销毁回调，并清空全部缓存
    ///
    /// 只释放容器自身持有的引用；循环依赖中的组件经 [`Autowired`] 槽位互相持有，
    /// 在此之后仍然存活。
    ///
    /// [`Autowired`]: di_abstractions::Autowired
    pub fn destroy_singletons(&self) -> Vec<DependencyError> {
        let _lock = self.creation_lock.lock();
        let disposables = std::mem::take(&mut *self.disposables.lock());
        let mut errors = Vec::new();

        for (name, raw) in disposables.into_iter().rev() {
            let Some(descriptor) = self.registry.descriptor(&name) else {
                continue;
            };
            match descriptor.definition.destroy(&raw) {
                Ok(()) => debug!("组件已销毁: {}", name),
                Err(source) => {
                    warn!("组件销毁失败: {}, 原因: {}", name, source);
                    errors.push(DependencyError::Destroy {
                        name,
                        message: source.to_string(),
                    });
                }
            }
        }

        self.singleton_objects.clear();
        self.early_singleton_objects.clear();
        self.singleton_factories.clear();
        self.creation_order.lock().clear();
        info!("单例已全部销毁");
        errors
    }

    /// 按具体类型取出；已代理的组件受具体类型访问策略约束
    pub fn typed<T: Any + Send + Sync>(
        &self,
        name: &str,
        bean: BeanRef,
    ) -> Result<Arc<T>, DependencyError> {
        if bean.is_advised() {
            match self.config.concrete_proxy_policy {
                ConcreteProxyPolicy::Reject => {
                    return Err(DependencyError::ConcreteProxyUnsupported {
                        name: name.to_string(),
                        expected: std::any::type_name::<T>().to_string(),
                    })
                }
                ConcreteProxyPolicy::PassThrough => {
                    warn!("以具体类型访问已代理的组件 {}，通知将被绕过", name)
                }
            }
        }
        bean.downcast::<T>()
            .ok_or_else(|| DependencyError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    /// 组件是否正在创建
    pub fn is_singleton_in_creation(&self, name: &str) -> bool {
        self.singletons_in_creation.contains(name)
    }

    /// 组件当前所在的缓存层级
    pub fn singleton_tier(&self, name: &str) -> Option<SingletonTier> {
        if self.singleton_objects.contains_key(name) {
            Some(SingletonTier::Finished)
        } else if self.early_singleton_objects.contains_key(name) {
            Some(SingletonTier::EarlyExposed)
        } else if self.singleton_factories.contains_key(name) {
            Some(SingletonTier::Factory)
        } else {
            None
        }
    }

    /// 已完成的单例名称，按完成顺序
    pub fn singleton_names(&self) -> Vec<String> {
        self.creation_order.lock().clone()
    }

    /// 统计信息
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_components: self.registry.len(),
            active_singletons: self.singleton_objects.len(),
            post_processors: self.pipeline.len(),
            proxies_created: 0,
            early_references: self.counters.early_references.load(Ordering::Relaxed),
            creation_failures: self.counters.creation_failures.load(Ordering::Relaxed),
        }
    }
}

impl BeanResolver for DefaultBeanFactory {
    fn get_bean(&self, name: &str) -> Result<BeanRef, DependencyError> {
        self.resolve(name)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.registry.contains(name) || self.singleton_objects.contains_key(name)
    }

    fn get_bean_typed<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, DependencyError> {
        let bean = self.resolve(name)?;
        self.typed(name, bean)
    }
}
