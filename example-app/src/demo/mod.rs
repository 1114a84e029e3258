//! 示例组件，根命名空间 `example_app.demo`

pub mod aspect;
pub mod service;
