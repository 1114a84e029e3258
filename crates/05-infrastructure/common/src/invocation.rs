//! 可调用接口面与操作签名

use crate::errors::InvocationError;
use crate::metadata::TypeInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use serde_json::Value;

/// 按名称调用的操作接口
///
/// 组件实现该 trait 后即拥有"接口面"：容器可以为其创建拦截代理，
/// 其他组件可以通过 `Autowired<dyn Invocable>` 注入并调用它。
pub trait Invocable: Send + Sync {
    /// 接口面声明的全部操作
    fn operations(&self) -> Vec<OperationSignature>;

    /// 调用指定操作
    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvocationError>;

    /// 按名称查找操作签名
    fn operation(&self, name: &str) -> Option<OperationSignature> {
        self.operations().into_iter().find(|signature| signature.name == name)
    }
}

/// 操作签名
///
/// 文本形式为 `{modifier} {return_type} {declaring_type}.{name}({params})`，
/// 例如 `public void demo.service.UserService.createUser(String)`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationSignature {
    /// 访问修饰符
    pub modifier: String,
    /// 返回类型
    pub return_type: String,
    /// 声明类型的点分全名
    pub declaring_type: String,
    /// 操作名称
    pub name: String,
    /// 参数类型
    pub parameter_types: Vec<String>,
}

impl OperationSignature {
    /// 创建新的操作签名
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            modifier: "public".to_string(),
            return_type: "void".to_string(),
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_types: Vec::new(),
        }
    }

    /// 以 Rust 类型作为声明类型
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(TypeInfo::of::<T>().dotted_path(), name)
    }

    /// 设置修饰符
    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier = modifier.into();
        self
    }

    /// 设置返回类型
    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// 追加参数类型
    pub fn param(mut self, parameter_type: impl Into<String>) -> Self {
        self.parameter_types.push(parameter_type.into());
        self
    }

    /// 声明类型的简单名称
    pub fn declaring_type_simple_name(&self) -> &str {
        self.declaring_type
            .rsplit('.')
            .next()
            .unwrap_or(&self.declaring_type)
    }
}

impl fmt::Display for OperationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}.{}({})",
            self.modifier,
            self.return_type,
            self.declaring_type,
            self.name,
            self.parameter_types.join(",")
        )
    }
}

/// 读取字符串参数
pub fn string_arg<'a>(
    operation: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a str, InvocationError> {
    match args.get(index) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(other) => Err(InvocationError::invalid_argument(
            operation,
            format!("第 {} 个参数应为字符串, 实际为 {}", index, other),
        )),
        None => Err(InvocationError::invalid_argument(
            operation,
            format!("缺少第 {} 个参数", index),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_text() {
        let signature = OperationSignature::new("demo.service.UserService", "createUser")
            .param("String");

        assert_eq!(
            signature.to_string(),
            "public void demo.service.UserService.createUser(String)"
        );
        assert_eq!(signature.declaring_type_simple_name(), "UserService");
    }

    #[test]
    fn test_string_arg() {
        let args = vec![Value::from("alice"), Value::from(3)];

        assert_eq!(string_arg("createUser", &args, 0).ok(), Some("alice"));
        assert!(string_arg("createUser", &args, 1).is_err());
        assert!(string_arg("createUser", &args, 2).is_err());
    }
}
