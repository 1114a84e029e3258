//! 自动代理后置处理器
//!
//! 为命中任一通知的组件创建 [`AopProxy`]。循环依赖中提前暴露的组件在
//! 早期引用阶段即被代理，初始化完成后不再重复代理，容器会以早期引用作为最终单例。

use crate::proxy::AopProxy;
use crate::registry::AspectRegistry;
use dashmap::DashMap;
use di_abstractions::BeanPostProcessor;
use infrastructure_common::{BeanRef, BoxError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// 自动代理后置处理器
pub struct AopPostProcessor {
    aspects: Arc<AspectRegistry>,
    /// 组件名称 -> 提前暴露时的原始实例
    early_proxy_references: DashMap<String, BeanRef>,
    proxies_created: AtomicUsize,
}

impl AopPostProcessor {
    /// 处理器名称
    pub const NAME: &'static str = "aopPostProcessor";

    /// 基于已绑定的切面创建处理器
    pub fn new(aspects: Arc<AspectRegistry>) -> Self {
        Self {
            aspects,
            early_proxy_references: DashMap::new(),
            proxies_created: AtomicUsize::new(0),
        }
    }

    /// 切面注册表
    pub fn aspects(&self) -> &Arc<AspectRegistry> {
        &self.aspects
    }

    /// 已创建的代理数量
    pub fn proxies_created(&self) -> usize {
        self.proxies_created.load(Ordering::Relaxed)
    }

    fn wrap_if_necessary(&self, bean: BeanRef, bean_name: &str) -> Result<BeanRef, BoxError> {
        if bean.is_advised() || self.aspects.is_aspect(bean_name) {
            return Ok(bean);
        }
        let Some(target) = bean.as_invocable() else {
            return Ok(bean);
        };

        let bindings = self.aspects.bindings_for(&target.operations());
        if bindings.is_empty() {
            trace!("组件 {} 没有命中的通知", bean_name);
            return Ok(bean);
        }

        debug!("为组件 {} 创建代理, 命中通知 {} 条", bean_name, bindings.len());
        let proxy = AopProxy::new(target, bean_name, &bindings)?;
        self.proxies_created.fetch_add(1, Ordering::Relaxed);
        Ok(BeanRef::advised(&bean, Arc::new(proxy)))
    }
}

impl BeanPostProcessor for AopPostProcessor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn post_process_after_initialization(
        &self,
        bean: BeanRef,
        bean_name: &str,
    ) -> Result<BeanRef, BoxError> {
        // 同一原始实例只代理一次；失败重试产生的新实例照常处理
        if let Some((_, early)) = self.early_proxy_references.remove(bean_name) {
            if early.ptr_eq(&bean) {
                trace!("组件 {} 已在早期引用阶段处理", bean_name);
                return Ok(bean);
            }
        }
        self.wrap_if_necessary(bean, bean_name)
    }

    fn early_bean_reference(&self, bean: BeanRef, bean_name: &str) -> Result<BeanRef, BoxError> {
        self.early_proxy_references
            .insert(bean_name.to_string(), bean.clone());
        self.wrap_if_necessary(bean, bean_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aop_abstractions::{AspectDefinition, JoinPoint};
    use infrastructure_common::{Invocable, InvocationError, OperationSignature, Value};

    #[derive(Default)]
    struct CountingAspect {
        calls: AtomicUsize,
    }

    #[derive(Default)]
    struct UserService;

    impl Invocable for UserService {
        fn operations(&self) -> Vec<OperationSignature> {
            vec![OperationSignature::new("demo.service.UserService", "createUser")]
        }

        fn invoke(&self, _operation: &str, _args: &[Value]) -> Result<Value, InvocationError> {
            Ok(Value::Null)
        }
    }

    #[derive(Default)]
    struct UserRepository;

    impl Invocable for UserRepository {
        fn operations(&self) -> Vec<OperationSignature> {
            vec![OperationSignature::new("demo.repository.UserRepository", "save")]
        }

        fn invoke(&self, _operation: &str, _args: &[Value]) -> Result<Value, InvocationError> {
            Ok(Value::Null)
        }
    }

    fn processor() -> (AopPostProcessor, Arc<CountingAspect>) {
        let aspect = Arc::new(CountingAspect::default());
        let mut registry = AspectRegistry::new();
        registry
            .register(
                "countingAspect",
                &BeanRef::new(aspect.clone()),
                &AspectDefinition::new().before(
                    "*Service.*",
                    "count",
                    |a: &CountingAspect, _: &JoinPoint<'_>| {
                        a.calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    },
                ),
            )
            .expect("register");
        (AopPostProcessor::new(Arc::new(registry)), aspect)
    }

    #[test]
    fn test_only_matching_invocable_beans_are_proxied() {
        let (processor, aspect) = processor();

        let service = BeanRef::with_interface(Arc::new(UserService));
        let proxied = processor
            .post_process_after_initialization(service.clone(), "userService")
            .expect("wrap");
        assert!(proxied.is_advised());
        assert!(!proxied.ptr_eq(&service));
        assert!(proxied.downcast::<UserService>().is_some());
        assert!(proxied.invoke("createUser", &[]).is_ok());
        assert_eq!(aspect.calls.load(Ordering::SeqCst), 1);

        let repository = BeanRef::with_interface(Arc::new(UserRepository));
        let untouched = processor
            .post_process_after_initialization(repository.clone(), "userRepository")
            .expect("skip");
        assert!(untouched.ptr_eq(&repository));

        let plain = BeanRef::new(Arc::new(String::from("config")));
        let untouched = processor
            .post_process_after_initialization(plain.clone(), "settings")
            .expect("skip");
        assert!(untouched.ptr_eq(&plain));

        assert_eq!(processor.proxies_created(), 1);
    }

    #[test]
    fn test_early_reference_is_not_wrapped_twice() {
        let (processor, _aspect) = processor();
        let raw = BeanRef::with_interface(Arc::new(UserService));

        let early = processor
            .early_bean_reference(raw.clone(), "userService")
            .expect("early");
        assert!(early.is_advised());

        let late = processor
            .post_process_after_initialization(raw.clone(), "userService")
            .expect("late");
        assert!(late.ptr_eq(&raw));
        assert_eq!(processor.proxies_created(), 1);

        // 早期引用之后创建失败并重试，新实例仍需代理
        processor
            .early_bean_reference(raw, "userService")
            .expect("early");
        let retried = BeanRef::with_interface(Arc::new(UserService));
        let wrapped = processor
            .post_process_after_initialization(retried, "userService")
            .expect("retry");
        assert!(wrapped.is_advised());
    }

    #[test]
    fn test_aspect_beans_are_skipped() {
        let (processor, _aspect) = processor();
        let service = BeanRef::with_interface(Arc::new(UserService));

        let result = processor
            .post_process_after_initialization(service.clone(), "countingAspect")
            .expect("skip");
        assert!(result.ptr_eq(&service));
    }
}
