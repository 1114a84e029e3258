//! 通知类型与处理函数

use crate::join_point::{JoinPoint, ProceedingJoinPoint};
use infrastructure_common::{InvocationError, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdviceKind {
    /// 目标调用之前
    Before,
    /// 目标调用之后，无论成功失败
    After,
    /// 包裹目标调用，由通知决定是否继续
    Around,
    /// 目标调用失败时
    AfterThrowing,
}

impl fmt::Display for AdviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::Around => "AROUND",
            Self::AfterThrowing => "AFTER_THROWING",
        };
        f.write_str(kind)
    }
}

/// BEFORE / AFTER 通知函数
pub type JoinPointFn = Arc<dyn Fn(&JoinPoint<'_>) -> anyhow::Result<()> + Send + Sync>;

/// AFTER_THROWING 通知函数，可以看到目标抛出的错误
pub type ThrowingFn =
    Arc<dyn Fn(&JoinPoint<'_>, &InvocationError) -> anyhow::Result<()> + Send + Sync>;

/// AROUND 通知函数，返回值即调用结果
pub type AroundFn =
    Arc<dyn Fn(ProceedingJoinPoint) -> Result<Value, InvocationError> + Send + Sync>;

/// 绑定到切面实例后的通知处理函数
#[derive(Clone)]
pub enum AdviceHandler {
    /// 前置通知
    Before(JoinPointFn),
    /// 后置通知
    After(JoinPointFn),
    /// 环绕通知
    Around(AroundFn),
    /// 异常通知
    AfterThrowing(ThrowingFn),
}

impl AdviceHandler {
    /// 通知类型
    pub fn kind(&self) -> AdviceKind {
        match self {
            Self::Before(_) => AdviceKind::Before,
            Self::After(_) => AdviceKind::After,
            Self::Around(_) => AdviceKind::Around,
            Self::AfterThrowing(_) => AdviceKind::AfterThrowing,
        }
    }
}

impl fmt::Debug for AdviceHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdviceHandler({})", self.kind())
    }
}
