//! 拦截代理
//!
//! 每次调用的执行流程：
//!
//! 1. 第一个命中的 AROUND 通知接管整个调用，由它决定是否继续执行目标；
//! 2. 否则依次执行 BEFORE，任何一个失败即中止调用；
//! 3. 执行目标操作；
//! 4. 目标失败时依次执行 AFTER_THROWING，再执行 AFTER，最后重新抛出原始错误，
//!    通知自身的失败作为附加错误挂在原始错误上；
//! 5. 目标成功时依次执行全部 AFTER，第一个 AFTER 失败成为调用失败，
//!    其余失败作为附加错误挂在其上。
//!
//! 一个操作名只对应一个签名，目标声明重名操作时构造代理失败。

use crate::registry::AdviceBinding;
use aop_abstractions::{AdviceHandler, JoinPoint, ProceedingJoinPoint};
use infrastructure_common::{Invocable, InvocationError, OperationSignature, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// 包装目标接口面的拦截代理
pub struct AopProxy {
    target: Arc<dyn Invocable>,
    target_name: String,
    operations: Vec<OperationSignature>,
    chains: HashMap<String, Vec<Arc<AdviceBinding>>>,
}

impl AopProxy {
    /// 创建代理，按操作预先计算命中的通知链
    ///
    /// 目标声明了重名操作时返回 [`InvocationError::DuplicateOperation`]。
    pub fn new(
        target: Arc<dyn Invocable>,
        target_name: impl Into<String>,
        bindings: &[Arc<AdviceBinding>],
    ) -> Result<Self, InvocationError> {
        let target_name = target_name.into();
        let operations = target.operations();
        let mut seen = HashSet::new();
        if let Some(duplicate) = operations.iter().find(|signature| !seen.insert(signature.name.as_str())) {
            return Err(InvocationError::DuplicateOperation {
                target: target_name,
                operation: duplicate.name.clone(),
            });
        }

        let chains = operations
            .iter()
            .map(|signature| {
                let chain = bindings
                    .iter()
                    .filter(|binding| binding.matches(signature))
                    .cloned()
                    .collect::<Vec<_>>();
                (signature.name.clone(), chain)
            })
            .filter(|(_, chain)| !chain.is_empty())
            .collect();

        Ok(Self {
            target,
            target_name,
            operations,
            chains,
        })
    }

    /// 被代理的组件名称
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// 被代理的原始接口面
    pub fn target(&self) -> &Arc<dyn Invocable> {
        &self.target
    }

    /// 指定操作命中的通知数量
    pub fn advice_count(&self, operation: &str) -> usize {
        self.chains.get(operation).map_or(0, Vec::len)
    }

    fn signature(&self, operation: &str) -> Option<&OperationSignature> {
        self.operations.iter().find(|signature| signature.name == operation)
    }

    fn invoke_advised(
        &self,
        chain: &[Arc<AdviceBinding>],
        signature: &OperationSignature,
        args: &[Value],
    ) -> Result<Value, InvocationError> {
        let around = chain.iter().find_map(|binding| match binding.handler() {
            AdviceHandler::Around(handler) => Some((binding, handler)),
            _ => None,
        });
        if let Some((binding, handler)) = around {
            trace!(
                "AROUND {}.{} 接管 {}.{}",
                binding.aspect_name(),
                binding.advice(),
                self.target_name,
                signature.name
            );
            let pjp = ProceedingJoinPoint::new(
                self.target.clone(),
                self.target_name.clone(),
                signature.clone(),
                args.to_vec(),
            );
            return handler(pjp);
        }

        let jp = JoinPoint::new(&self.target_name, signature, args);

        for binding in chain {
            if let AdviceHandler::Before(handler) = binding.handler() {
                trace!("BEFORE {}.{}", binding.aspect_name(), binding.advice());
                handler(&jp).map_err(|error| binding.failure(error))?;
            }
        }

        match self.target.invoke(&signature.name, args) {
            Ok(value) => {
                let mut failures = self.run_after(chain, &jp).into_iter();
                match failures.next() {
                    Some(first) => Err(first.with_suppressed(failures.collect())),
                    None => Ok(value),
                }
            }
            Err(primary) => {
                let mut suppressed = Vec::new();
                for binding in chain {
                    if let AdviceHandler::AfterThrowing(handler) = binding.handler() {
                        trace!("AFTER_THROWING {}.{}", binding.aspect_name(), binding.advice());
                        if let Err(error) = handler(&jp, &primary) {
                            suppressed.push(binding.failure(error));
                        }
                    }
                }
                suppressed.extend(self.run_after(chain, &jp));
                Err(primary.with_suppressed(suppressed))
            }
        }
    }

    /// 按绑定顺序执行全部 AFTER，收集失败
    fn run_after(&self, chain: &[Arc<AdviceBinding>], jp: &JoinPoint<'_>) -> Vec<InvocationError> {
        let mut failures = Vec::new();
        for binding in chain {
            if let AdviceHandler::After(handler) = binding.handler() {
                trace!("AFTER {}.{}", binding.aspect_name(), binding.advice());
                if let Err(error) = handler(jp) {
                    failures.push(binding.failure(error));
                }
            }
        }
        failures
    }
}

impl Invocable for AopProxy {
    fn operations(&self) -> Vec<OperationSignature> {
        self.operations.clone()
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvocationError> {
        match (self.chains.get(operation), self.signature(operation)) {
            (Some(chain), Some(signature)) => self.invoke_advised(chain, signature, args),
            _ => self.target.invoke(operation, args),
        }
    }

    fn operation(&self, name: &str) -> Option<OperationSignature> {
        self.signature(name).cloned()
    }
}

impl fmt::Debug for AopProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AopProxy")
            .field("target_name", &self.target_name)
            .field("advised_operations", &self.chains.keys().collect::<Vec<_>>())
            .finish()
    }
}
