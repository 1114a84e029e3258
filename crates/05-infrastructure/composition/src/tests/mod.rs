//! 应用上下文测试
