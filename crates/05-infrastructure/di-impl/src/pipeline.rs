//! 后置处理器流水线

use di_abstractions::BeanPostProcessor;
use infrastructure_common::{BeanRef, CreationStage, DependencyError};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy)]
enum Hook {
    BeforeInitialization,
    AfterInitialization,
    EarlyReference,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hook = match self {
            Self::BeforeInitialization => "before_initialization",
            Self::AfterInitialization => "after_initialization",
            Self::EarlyReference => "early_reference",
        };
        f.write_str(hook)
    }
}

/// 后置处理器流水线
///
/// 处理器按添加顺序串联执行；任一处理器失败即终止，该组件创建失败。
#[derive(Default)]
pub struct PostProcessorPipeline {
    processors: RwLock<Vec<Arc<dyn BeanPostProcessor>>>,
}

impl PostProcessorPipeline {
    /// 创建空流水线
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加处理器
    pub fn add(&self, processor: Arc<dyn BeanPostProcessor>) {
        self.processors.write().push(processor);
    }

    /// 处理器数量
    pub fn len(&self) -> usize {
        self.processors.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.processors.read().is_empty()
    }

    /// 处理器名称，按执行顺序
    pub fn names(&self) -> Vec<String> {
        self.processors
            .read()
            .iter()
            .map(|processor| processor.name().to_string())
            .collect()
    }

    /// 生命周期回调之前
    pub fn apply_before_initialization(
        &self,
        bean: BeanRef,
        bean_name: &str,
    ) -> Result<BeanRef, DependencyError> {
        self.apply(bean, bean_name, Hook::BeforeInitialization)
    }

    /// 生命周期回调之后
    pub fn apply_after_initialization(
        &self,
        bean: BeanRef,
        bean_name: &str,
    ) -> Result<BeanRef, DependencyError> {
        self.apply(bean, bean_name, Hook::AfterInitialization)
    }

    /// 提前暴露引用
    pub fn apply_early_reference(
        &self,
        bean: BeanRef,
        bean_name: &str,
    ) -> Result<BeanRef, DependencyError> {
        self.apply(bean, bean_name, Hook::EarlyReference)
    }

    fn apply(&self, bean: BeanRef, bean_name: &str, hook: Hook) -> Result<BeanRef, DependencyError> {
        // 回调期间不持有锁，处理器可以再次访问容器
        let processors = self.processors.read().clone();

        let mut current = bean;
        for processor in processors {
            let result = match hook {
                Hook::BeforeInitialization => {
                    processor.post_process_before_initialization(current, bean_name)
                }
                Hook::AfterInitialization => {
                    processor.post_process_after_initialization(current, bean_name)
                }
                Hook::EarlyReference => processor.early_bean_reference(current, bean_name),
            };

            current = result.map_err(|source| {
                warn!(
                    "后置处理器 {} 处理组件 {} 失败 ({}): {}",
                    processor.name(),
                    bean_name,
                    hook,
                    source
                );
                DependencyError::creation(bean_name, CreationStage::PostProcess, source)
            })?;
            trace!("后置处理器 {} 已处理组件 {} ({})", processor.name(), bean_name, hook);
        }

        Ok(current)
    }
}
