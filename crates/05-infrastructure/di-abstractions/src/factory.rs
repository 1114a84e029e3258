//! 组件定义与工厂
//!
//! [`ComponentDefinition`] 描述如何构造一个组件、它依赖谁、
//! 创建后与销毁前调用什么，以及它是否是切面或后置处理器。

use crate::injection::DependencyDescriptor;
use crate::post_processor::BeanPostProcessor;
use aop_abstractions::AspectDefinition;
use infrastructure_common::{BeanRef, BoxError, DependencyError, Invocable, TypeInfo};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 早期引用工厂：调用时产出（可能经过后置处理器替换的）早期引用
pub type ObjectFactory = Arc<dyn Fn() -> Result<BeanRef, DependencyError> + Send + Sync>;

type Constructor = Arc<dyn Fn() -> Result<BeanRef, BoxError> + Send + Sync>;
type ProcessorConstructor =
    Arc<dyn Fn() -> Result<Arc<dyn BeanPostProcessor>, BoxError> + Send + Sync>;
type Callback = Arc<dyn Fn(&BeanRef) -> Result<(), BoxError> + Send + Sync>;

/// 依赖注入完成后的初始化回调
pub trait InitializingBean {
    /// 全部依赖写入后调用
    fn after_properties_set(&self) -> Result<(), BoxError>;
}

/// 容器关闭时的销毁回调
pub trait DisposableBean {
    /// 容器关闭时调用
    fn destroy(&self) -> Result<(), BoxError>;
}

/// 能给出自身组件定义的类型，通常由 `#[derive(Component)]` 生成
pub trait ComponentType: Any + Send + Sync {
    /// 组件定义
    fn definition() -> ComponentDefinition
    where
        Self: Sized;
}

#[derive(Clone)]
enum Instantiation {
    Bean(Constructor),
    PostProcessor(ProcessorConstructor),
}

/// 组件定义
#[derive(Clone)]
pub struct ComponentDefinition {
    type_info: TypeInfo,
    explicit_name: Option<String>,
    instantiation: Instantiation,
    dependencies: Vec<DependencyDescriptor>,
    init: Option<Callback>,
    destroy: Option<Callback>,
    aspect: Option<AspectDefinition>,
}

impl ComponentDefinition {
    /// 以构造函数定义只暴露具体类型的组件
    pub fn new<T, F>(constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let constructor: Constructor =
            Arc::new(move || constructor().map(|instance| BeanRef::new(Arc::new(instance))));
        Self::with_instantiation(TypeInfo::of::<T>(), Instantiation::Bean(constructor))
    }

    /// 以构造函数定义暴露可调用接口的组件
    pub fn with_interface<T, F>(constructor: F) -> Self
    where
        T: Invocable + Any,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let constructor: Constructor = Arc::new(move || {
            constructor().map(|instance| BeanRef::with_interface(Arc::new(instance)))
        });
        Self::with_instantiation(TypeInfo::of::<T>(), Instantiation::Bean(constructor))
    }

    /// 以 `Default` 构造只暴露具体类型的组件
    pub fn of<T: Default + Any + Send + Sync>() -> Self {
        Self::new(|| Ok(T::default()))
    }

    /// 以 `Default` 构造暴露可调用接口的组件
    pub fn invocable<T: Default + Invocable + Any>() -> Self {
        Self::with_interface(|| Ok(T::default()))
    }

    /// 以 `Default` 构造后置处理器
    pub fn post_processor<P: BeanPostProcessor + Default + 'static>() -> Self {
        Self::post_processor_with(|| Ok(P::default()))
    }

    /// 以构造函数定义后置处理器
    pub fn post_processor_with<P, F>(constructor: F) -> Self
    where
        P: BeanPostProcessor + 'static,
        F: Fn() -> Result<P, BoxError> + Send + Sync + 'static,
    {
        let constructor: ProcessorConstructor = Arc::new(move || {
            constructor().map(|processor| Arc::new(processor) as Arc<dyn BeanPostProcessor>)
        });
        Self::with_instantiation(TypeInfo::of::<P>(), Instantiation::PostProcessor(constructor))
    }

    fn with_instantiation(type_info: TypeInfo, instantiation: Instantiation) -> Self {
        Self {
            type_info,
            explicit_name: None,
            instantiation,
            dependencies: Vec::new(),
            init: None,
            destroy: None,
            aspect: None,
        }
    }

    /// 指定组件名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.explicit_name = Some(name.into());
        self
    }

    /// 声明依赖
    pub fn depends_on(mut self, dependency: DependencyDescriptor) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// 设置初始化回调，在依赖注入和前置处理之后、后置处理之前调用
    pub fn with_init<T, E, F>(mut self, callback: F) -> Self
    where
        T: Any + Send + Sync,
        E: Into<BoxError>,
        F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
    {
        self.init = Some(Self::callback(callback));
        self
    }

    /// 设置销毁回调，容器关闭时调用
    pub fn with_destroy<T, E, F>(mut self, callback: F) -> Self
    where
        T: Any + Send + Sync,
        E: Into<BoxError>,
        F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
    {
        self.destroy = Some(Self::callback(callback));
        self
    }

    /// 以 [`InitializingBean`] 作为初始化回调
    pub fn initializing<T: InitializingBean + Any + Send + Sync>(self) -> Self {
        self.with_init(|bean: &T| bean.after_properties_set())
    }

    /// 以 [`DisposableBean`] 作为销毁回调
    pub fn disposable<T: DisposableBean + Any + Send + Sync>(self) -> Self {
        self.with_destroy(|bean: &T| bean.destroy())
    }

    /// 声明为切面
    pub fn aspect(mut self, aspect: AspectDefinition) -> Self {
        self.aspect = Some(aspect);
        self
    }

    fn callback<T, E, F>(callback: F) -> Callback
    where
        T: Any + Send + Sync,
        E: Into<BoxError>,
        F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
    {
        Arc::new(move |bean: &BeanRef| {
            let instance = bean.downcast_ref::<T>().ok_or_else(|| -> BoxError {
                format!(
                    "生命周期回调需要 {}, 实际为 {}",
                    std::any::type_name::<T>(),
                    bean.type_name()
                )
                .into()
            })?;
            callback(instance).map_err(Into::into)
        })
    }

    /// 类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 显式名称
    pub fn explicit_name(&self) -> Option<&str> {
        self.explicit_name.as_deref()
    }

    /// 依赖列表
    pub fn dependencies(&self) -> &[DependencyDescriptor] {
        &self.dependencies
    }

    /// 切面声明
    pub fn aspect_definition(&self) -> Option<&AspectDefinition> {
        self.aspect.as_ref()
    }

    /// 是否是切面
    pub fn is_aspect(&self) -> bool {
        self.aspect.is_some()
    }

    /// 是否是后置处理器
    pub fn is_post_processor(&self) -> bool {
        matches!(self.instantiation, Instantiation::PostProcessor(_))
    }

    /// 是否有初始化回调
    pub fn has_init(&self) -> bool {
        self.init.is_some()
    }

    /// 是否有销毁回调
    pub fn has_destroy(&self) -> bool {
        self.destroy.is_some()
    }

    /// 构造原始实例
    pub fn instantiate(&self) -> Result<BeanRef, BoxError> {
        match &self.instantiation {
            Instantiation::Bean(constructor) => constructor(),
            Instantiation::PostProcessor(_) => Err(format!(
                "{} 是后置处理器, 不能作为普通组件创建",
                self.type_info.name
            )
            .into()),
        }
    }

    /// 构造后置处理器；普通组件返回 `None`
    pub fn instantiate_processor(&self) -> Option<Result<Arc<dyn BeanPostProcessor>, BoxError>> {
        match &self.instantiation {
            Instantiation::PostProcessor(constructor) => Some(constructor()),
            Instantiation::Bean(_) => None,
        }
    }

    /// 执行初始化回调
    pub fn initialize(&self, bean: &BeanRef) -> Result<(), BoxError> {
        match &self.init {
            Some(init) => init(bean),
            None => Ok(()),
        }
    }

    /// 执行销毁回调
    pub fn destroy(&self, bean: &BeanRef) -> Result<(), BoxError> {
        match &self.destroy {
            Some(destroy) => destroy(bean),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("type", &self.type_info.full_path)
            .field("explicit_name", &self.explicit_name)
            .field("dependencies", &self.dependencies)
            .field("post_processor", &self.is_post_processor())
            .field("aspect", &self.aspect)
            .field("init", &self.init.is_some())
            .field("destroy", &self.destroy.is_some())
            .finish()
    }
}
