//! # Component Macros
//!
//! 这个 crate 提供从结构体声明生成组件定义的派生宏。
//!
//! 生成的代码引用 `di_abstractions`，使用方需要直接依赖它。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Component;
//! use di_abstractions::Autowired;
//! use infrastructure_common::Invocable;
//!
//! #[derive(Default, Component)]
//! #[component(invocable, register, destroy = "shutdown")]
//! pub struct UserService {
//!     #[autowired]
//!     order_service: Autowired<dyn Invocable>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attributes;
mod component;

/// 组件派生宏
///
/// 为结构体实现 `di_abstractions::ComponentType`，组件以 `Default` 构造。
///
/// # 结构体参数 `#[component(...)]`
///
/// - `name = "..."` - 显式组件名称，缺省时为类型名首字母小写
/// - `invocable` - 以可调用接口暴露，类型需实现 `Invocable`
/// - `init = "method"` - 依赖注入后调用的方法，签名为 `fn(&self) -> Result<(), E>`
/// - `destroy = "method"` - 容器关闭时调用的方法，签名同上
/// - `aspect = "function"` - 返回 `AspectDefinition` 的关联函数，把组件声明为切面
/// - `register` - 通过 `inventory` 提交链接期登记
///
/// # 字段参数 `#[autowired(...)]`
///
/// 字段类型必须是 `Autowired<T>` 或 `Autowired<dyn Invocable>`。
///
/// - `name = "..."` - 依赖名称，缺省时由字段名转换：`order_service` -> `orderService`
/// - `required = false` / `optional` - 依赖未注册时跳过
#[proc_macro_derive(Component, attributes(component, autowired))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
