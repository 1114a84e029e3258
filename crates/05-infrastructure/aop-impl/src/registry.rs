//! 通知绑定与切面注册表

use crate::pointcut::Pointcut;
use aop_abstractions::{AdviceDeclaration, AdviceHandler, AdviceKind, AspectDefinition};
use infrastructure_common::{BeanRef, ConfigurationError, InvocationError, OperationSignature};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 绑定到切面实例的一条通知
#[derive(Clone)]
pub struct AdviceBinding {
    aspect_name: String,
    advice: String,
    order: i32,
    pointcut: Pointcut,
    handler: AdviceHandler,
}

impl AdviceBinding {
    /// 绑定一条通知声明
    pub fn bind(
        aspect_name: &str,
        aspect: &BeanRef,
        order: i32,
        declaration: &AdviceDeclaration,
    ) -> Result<Self, ConfigurationError> {
        let pointcut = Pointcut::parse(declaration.pointcut())?;
        let handler = declaration
            .bind(aspect)
            .ok_or_else(|| ConfigurationError::MissingMetadata {
                type_name: aspect.type_name().to_string(),
                message: format!(
                    "切面 {} 的实例类型与通知 {} 的声明不符",
                    aspect_name,
                    declaration.advice()
                ),
            })?;

        Ok(Self {
            aspect_name: aspect_name.to_string(),
            advice: declaration.advice().to_string(),
            order,
            pointcut,
            handler,
        })
    }

    /// 切面组件名称
    pub fn aspect_name(&self) -> &str {
        &self.aspect_name
    }

    /// 通知操作名称
    pub fn advice(&self) -> &str {
        &self.advice
    }

    /// 通知类型
    pub fn kind(&self) -> AdviceKind {
        self.handler.kind()
    }

    /// 切面顺序
    pub fn order(&self) -> i32 {
        self.order
    }

    /// 切点
    pub fn pointcut(&self) -> &Pointcut {
        &self.pointcut
    }

    /// 处理函数
    pub fn handler(&self) -> &AdviceHandler {
        &self.handler
    }

    /// 签名是否命中切点
    pub fn matches(&self, signature: &OperationSignature) -> bool {
        self.pointcut.matches(signature)
    }

    /// 把通知自身的失败包装为调用错误
    pub fn failure(&self, message: impl fmt::Display) -> InvocationError {
        InvocationError::Advice {
            aspect: self.aspect_name.clone(),
            advice: self.advice.clone(),
            kind: self.kind().to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Debug for AdviceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceBinding")
            .field("aspect", &self.aspect_name)
            .field("advice", &self.advice)
            .field("kind", &self.kind())
            .field("order", &self.order)
            .field("pointcut", &self.pointcut.expression())
            .finish()
    }
}

/// 切面注册表
///
/// 通知按切面 `order` 升序排列；同序切面保持注册顺序，切面内保持声明顺序。
#[derive(Debug, Default)]
pub struct AspectRegistry {
    bindings: Vec<Arc<AdviceBinding>>,
    aspect_names: Vec<String>,
}

impl AspectRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册切面实例的全部通知
    pub fn register(
        &mut self,
        aspect_name: &str,
        aspect: &BeanRef,
        definition: &AspectDefinition,
    ) -> Result<usize, ConfigurationError> {
        let bindings = definition
            .advices()
            .iter()
            .map(|declaration| AdviceBinding::bind(aspect_name, aspect, definition.order(), declaration))
            .collect::<Result<Vec<_>, _>>()?;

        for binding in &bindings {
            debug!(
                "绑定通知: {}.{} ({}) -> {}",
                aspect_name,
                binding.advice(),
                binding.kind(),
                binding.pointcut()
            );
        }

        let count = bindings.len();
        self.bindings.extend(bindings.into_iter().map(Arc::new));
        // 稳定排序，保持注册与声明顺序
        self.bindings.sort_by_key(|binding| binding.order());
        self.aspect_names.push(aspect_name.to_string());
        info!("注册切面: {} (order = {}, 通知 {} 条)", aspect_name, definition.order(), count);
        Ok(count)
    }

    /// 命中任一操作的通知，保持执行顺序
    pub fn bindings_for(&self, operations: &[OperationSignature]) -> Vec<Arc<AdviceBinding>> {
        self.bindings
            .iter()
            .filter(|binding| operations.iter().any(|signature| binding.matches(signature)))
            .cloned()
            .collect()
    }

    /// 全部通知
    pub fn bindings(&self) -> &[Arc<AdviceBinding>] {
        &self.bindings
    }

    /// 是否为切面组件
    pub fn is_aspect(&self, name: &str) -> bool {
        self.aspect_names.iter().any(|aspect| aspect == name)
    }

    /// 切面组件名称
    pub fn aspect_names(&self) -> &[String] {
        &self.aspect_names
    }

    /// 是否没有任何通知
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
