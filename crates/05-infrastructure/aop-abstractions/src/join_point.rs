//! 连接点
//!
//! 通知执行时可见的调用上下文。

use infrastructure_common::{Invocable, InvocationError, OperationSignature, Value};
use std::fmt;
use std::sync::Arc;

/// 连接点：一次被拦截的调用
#[derive(Debug, Clone, Copy)]
pub struct JoinPoint<'a> {
    target_name: &'a str,
    signature: &'a OperationSignature,
    args: &'a [Value],
}

impl<'a> JoinPoint<'a> {
    /// 创建新的连接点
    pub fn new(target_name: &'a str, signature: &'a OperationSignature, args: &'a [Value]) -> Self {
        Self {
            target_name,
            signature,
            args,
        }
    }

    /// 目标组件名称
    pub fn target_name(&self) -> &'a str {
        self.target_name
    }

    /// 被调用操作的签名
    pub fn signature(&self) -> &'a OperationSignature {
        self.signature
    }

    /// 操作名称
    pub fn operation_name(&self) -> &'a str {
        &self.signature.name
    }

    /// 调用参数
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// 目标类型的点分全名
    pub fn target_type(&self) -> &'a str {
        &self.signature.declaring_type
    }
}

/// 可继续执行的连接点，仅 AROUND 通知可见
pub struct ProceedingJoinPoint {
    target: Arc<dyn Invocable>,
    target_name: String,
    signature: OperationSignature,
    args: Vec<Value>,
}

impl ProceedingJoinPoint {
    /// 创建新的可继续连接点
    pub fn new(
        target: Arc<dyn Invocable>,
        target_name: impl Into<String>,
        signature: OperationSignature,
        args: Vec<Value>,
    ) -> Self {
        Self {
            target,
            target_name: target_name.into(),
            signature,
            args,
        }
    }

    /// 以原始参数调用目标
    pub fn proceed(&self) -> Result<Value, InvocationError> {
        self.target.invoke(&self.signature.name, &self.args)
    }

    /// 以替换后的参数调用目标
    pub fn proceed_with(&self, args: &[Value]) -> Result<Value, InvocationError> {
        self.target.invoke(&self.signature.name, args)
    }

    /// 被调用操作的签名
    pub fn signature(&self) -> &OperationSignature {
        &self.signature
    }

    /// 调用参数
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// 目标组件名称
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// 目标类型的点分全名
    pub fn target_type(&self) -> &str {
        &self.signature.declaring_type
    }

    /// 只读视图
    pub fn join_point(&self) -> JoinPoint<'_> {
        JoinPoint::new(&self.target_name, &self.signature, &self.args)
    }
}

impl fmt::Debug for ProceedingJoinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProceedingJoinPoint")
            .field("target_name", &self.target_name)
            .field("signature", &self.signature.to_string())
            .field("args", &self.args)
            .finish()
    }
}
