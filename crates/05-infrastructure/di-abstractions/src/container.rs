//! 容器配置与统计

use serde::{Deserialize, Serialize};

/// 具体类型访问已代理组件时的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConcreteProxyPolicy {
    /// 拒绝访问，报告错误
    #[default]
    Reject,
    /// 返回原始实例，绕过全部通知
    PassThrough,
}

/// 容器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用拦截层
    pub enable_aop: bool,
    /// 刷新时是否预先创建全部单例
    pub eager_init: bool,
    /// 早期引用与最终对象不一致时是否仍然放行
    pub allow_raw_injection_despite_wrapping: bool,
    /// 具体类型访问已代理组件时的策略
    pub concrete_proxy_policy: ConcreteProxyPolicy,
    /// 嵌套创建的最大深度
    pub max_creation_depth: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_aop: true,
            eager_init: true,
            allow_raw_injection_despite_wrapping: false,
            concrete_proxy_policy: ConcreteProxyPolicy::Reject,
            max_creation_depth: 64,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// 已注册组件数
    pub registered_components: usize,
    /// 已完成的单例数
    pub active_singletons: usize,
    /// 已安装的后置处理器数
    pub post_processors: usize,
    /// 已创建的代理数
    pub proxies_created: usize,
    /// 早期引用暴露次数
    pub early_references: u64,
    /// 创建失败次数
    pub creation_failures: u64,
}
