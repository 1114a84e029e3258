//! 日志切面

use aop_abstractions::{AspectDefinition, JoinPoint, ProceedingJoinPoint};
use component_macros::Component;
use infrastructure_common::InvocationError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{info, warn};

const SERVICE_OPERATIONS: &str = "execution(* example_app.demo.service.*.*(..))";

/// 记录服务调用
#[derive(Default, Component)]
#[component(aspect = "advice", register)]
pub struct LoggingAspect {
    calls: AtomicUsize,
}

impl LoggingAspect {
    fn advice() -> AspectDefinition {
        AspectDefinition::new()
            .with_order(10)
            .before(SERVICE_OPERATIONS, "logBefore", |aspect: &LoggingAspect, jp: &JoinPoint<'_>| {
                aspect.calls.fetch_add(1, Ordering::Relaxed);
                info!("[AOP] 调用前: {}.{} 参数 {:?}", jp.target_name(), jp.operation_name(), jp.args());
                Ok(())
            })
            .after(SERVICE_OPERATIONS, "logAfter", |_: &LoggingAspect, jp: &JoinPoint<'_>| {
                info!("[AOP] 调用后: {}.{}", jp.target_name(), jp.operation_name());
                Ok(())
            })
            .after_throwing(
                SERVICE_OPERATIONS,
                "logError",
                |_: &LoggingAspect, jp: &JoinPoint<'_>, error: &InvocationError| {
                    warn!("[AOP] 调用失败: {}.{}: {}", jp.target_name(), jp.operation_name(), error);
                    Ok(())
                },
            )
            .around("*Service.delete*", "timeDelete", |_: &LoggingAspect, pjp: ProceedingJoinPoint| {
                let started = Instant::now();
                let result = pjp.proceed();
                info!("[AOP] {} 耗时 {:?}", pjp.signature(), started.elapsed());
                result
            })
    }

    /// 已记录的调用次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}
