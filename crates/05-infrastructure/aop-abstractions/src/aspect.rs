//! 切面声明
//!
//! 切面组件在定义中携带 [`AspectDefinition`]；容器创建切面实例后，
//! 每条 [`AdviceDeclaration`] 绑定到该实例得到 [`AdviceHandler`]。

use crate::advice::{AdviceHandler, AdviceKind, AroundFn, JoinPointFn, ThrowingFn};
use crate::join_point::{JoinPoint, ProceedingJoinPoint};
use infrastructure_common::{BeanRef, InvocationError, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Binder = Arc<dyn Fn(&BeanRef) -> Option<AdviceHandler> + Send + Sync>;

/// 单条通知声明
#[derive(Clone)]
pub struct AdviceDeclaration {
    kind: AdviceKind,
    pointcut: String,
    advice: String,
    binder: Binder,
}

impl AdviceDeclaration {
    /// 前置通知
    pub fn before<A, F>(pointcut: impl Into<String>, advice: impl Into<String>, f: F) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(&A, &JoinPoint<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::with_binder(AdviceKind::Before, pointcut, advice, move |aspect| {
            let instance = aspect.downcast::<A>()?;
            let f = f.clone();
            let handler: JoinPointFn = Arc::new(move |jp: &JoinPoint<'_>| f(&*instance, jp));
            Some(AdviceHandler::Before(handler))
        })
    }

    /// 后置通知
    pub fn after<A, F>(pointcut: impl Into<String>, advice: impl Into<String>, f: F) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(&A, &JoinPoint<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::with_binder(AdviceKind::After, pointcut, advice, move |aspect| {
            let instance = aspect.downcast::<A>()?;
            let f = f.clone();
            let handler: JoinPointFn = Arc::new(move |jp: &JoinPoint<'_>| f(&*instance, jp));
            Some(AdviceHandler::After(handler))
        })
    }

    /// 环绕通知
    pub fn around<A, F>(pointcut: impl Into<String>, advice: impl Into<String>, f: F) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(&A, ProceedingJoinPoint) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::with_binder(AdviceKind::Around, pointcut, advice, move |aspect| {
            let instance = aspect.downcast::<A>()?;
            let f = f.clone();
            let handler: AroundFn = Arc::new(move |pjp: ProceedingJoinPoint| f(&*instance, pjp));
            Some(AdviceHandler::Around(handler))
        })
    }

    /// 异常通知
    pub fn after_throwing<A, F>(pointcut: impl Into<String>, advice: impl Into<String>, f: F) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(&A, &JoinPoint<'_>, &InvocationError) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::with_binder(AdviceKind::AfterThrowing, pointcut, advice, move |aspect| {
            let instance = aspect.downcast::<A>()?;
            let f = f.clone();
            let handler: ThrowingFn =
                Arc::new(move |jp: &JoinPoint<'_>, error: &InvocationError| f(&*instance, jp, error));
            Some(AdviceHandler::AfterThrowing(handler))
        })
    }

    fn with_binder(
        kind: AdviceKind,
        pointcut: impl Into<String>,
        advice: impl Into<String>,
        binder: impl Fn(&BeanRef) -> Option<AdviceHandler> + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            pointcut: pointcut.into(),
            advice: advice.into(),
            binder: Arc::new(binder),
        }
    }

    /// 通知类型
    pub fn kind(&self) -> AdviceKind {
        self.kind
    }

    /// 切点表达式
    pub fn pointcut(&self) -> &str {
        &self.pointcut
    }

    /// 通知操作名称
    pub fn advice(&self) -> &str {
        &self.advice
    }

    /// 绑定到切面实例；实例类型与声明不符时返回 `None`
    pub fn bind(&self, aspect: &BeanRef) -> Option<AdviceHandler> {
        (self.binder)(aspect)
    }
}

impl fmt::Debug for AdviceDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceDeclaration")
            .field("kind", &self.kind)
            .field("pointcut", &self.pointcut)
            .field("advice", &self.advice)
            .finish()
    }
}

/// 切面声明
///
/// `order` 越小越先执行；同序的切面按扫描顺序排列，切面内的通知按声明顺序排列。
#[derive(Debug, Clone, Default)]
pub struct AspectDefinition {
    order: i32,
    advices: Vec<AdviceDeclaration>,
}

impl AspectDefinition {
    /// 创建空的切面声明
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置切面顺序
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// 添加通知声明
    pub fn advice(mut self, declaration: AdviceDeclaration) -> Self {
        self.advices.push(declaration);
        self
    }

    /// 添加前置通知
    pub fn before<A, F>(self, pointcut: impl Into<String>, advice: impl Into<String>, f: F) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(&A, &JoinPoint<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.advice(AdviceDeclaration::before(pointcut, advice, f))
    }

    /// 添加后置通知
    pub fn after<A, F>(self, pointcut: impl Into<String>, advice: impl Into<String>, f: F) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(&A, &JoinPoint<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.advice(AdviceDeclaration::after(pointcut, advice, f))
    }

    /// 添加环绕通知
    pub fn around<A, F>(self, pointcut: impl Into<String>, advice: impl Into<String>, f: F) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(&A, ProceedingJoinPoint) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        self.advice(AdviceDeclaration::around(pointcut, advice, f))
    }

    /// 添加异常通知
    pub fn after_throwing<A, F>(
        self,
        pointcut: impl Into<String>,
        advice: impl Into<String>,
        f: F,
    ) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(&A, &JoinPoint<'_>, &InvocationError) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.advice(AdviceDeclaration::after_throwing(pointcut, advice, f))
    }

    /// 切面顺序
    pub fn order(&self) -> i32 {
        self.order
    }

    /// 全部通知声明
    pub fn advices(&self) -> &[AdviceDeclaration] {
        &self.advices
    }
}
