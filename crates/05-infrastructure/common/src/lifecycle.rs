//! 容器生命周期管理

use std::fmt;

/// 应用上下文状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextState {
    /// 已创建，尚未扫描
    Created,
    /// 扫描完成，组件已注册
    Scanned,
    /// 正在刷新（安装后置处理器、创建单例）
    Refreshing,
    /// 就绪
    Ready,
    /// 已关闭
    Closed,
    /// 启动失败
    Failed,
}

impl ContextState {
    /// 是否允许迁移到目标状态
    pub fn can_transition_to(self, next: ContextState) -> bool {
        use ContextState::*;
        matches!(
            (self, next),
            (Created, Scanned)
                | (Scanned, Refreshing)
                | (Refreshing, Ready)
                | (Ready, Closed)
                | (Created | Scanned | Refreshing, Failed)
                | (Failed, Closed)
        )
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Created => "Created",
            Self::Scanned => "Scanned",
            Self::Refreshing => "Refreshing",
            Self::Ready => "Ready",
            Self::Closed => "Closed",
            Self::Failed => "Failed",
        };
        f.write_str(state)
    }
}

/// 清理守卫
///
/// 离开作用域时执行清理回调，无论正常返回还是提前以错误返回。
pub struct CleanupGuard<F: FnOnce()> {
    cleanup: Option<F>,
}

impl<F: FnOnce()> CleanupGuard<F> {
    /// 创建新的清理守卫
    pub fn new(cleanup: F) -> Self {
        Self {
            cleanup: Some(cleanup),
        }
    }
}

impl<F: FnOnce()> Drop for CleanupGuard<F> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}
