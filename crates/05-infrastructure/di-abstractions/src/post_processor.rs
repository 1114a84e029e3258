//! 组件后置处理器

use infrastructure_common::{BeanRef, BoxError};

/// 组件后置处理器
///
/// 每个钩子接收当前对象并返回替代对象，默认原样返回。
/// 处理器按注册顺序串联执行，前一个的输出是后一个的输入。
pub trait BeanPostProcessor: Send + Sync {
    /// 处理器名称，用于日志
    fn name(&self) -> &str;

    /// 生命周期回调之前
    fn post_process_before_initialization(
        &self,
        bean: BeanRef,
        _bean_name: &str,
    ) -> Result<BeanRef, BoxError> {
        Ok(bean)
    }

    /// 生命周期回调之后
    fn post_process_after_initialization(
        &self,
        bean: BeanRef,
        _bean_name: &str,
    ) -> Result<BeanRef, BoxError> {
        Ok(bean)
    }

    /// 循环依赖中提前暴露引用时调用
    ///
    /// 需要替换对象的处理器（如代理）应在此返回与最终对象一致的引用。
    fn early_bean_reference(&self, bean: BeanRef, _bean_name: &str) -> Result<BeanRef, BoxError> {
        Ok(bean)
    }
}
