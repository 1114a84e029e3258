//! 组件约定规范
//!
//! 定义组件命名、依赖字段命名和命名空间归属的约定

use crate::errors::ConfigurationError;
use crate::metadata::TypeInfo;

/// 命名约定
pub struct NamingConventions;

impl NamingConventions {
    /// 首字母小写：`UserService` -> `userService`
    pub fn decapitalize(name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// 推导组件名称：显式名称优先，否则取类型简单名称并首字母小写
    pub fn derive_bean_name(
        explicit_name: Option<&str>,
        type_info: &TypeInfo,
    ) -> Result<String, ConfigurationError> {
        let name = match explicit_name.map(str::trim) {
            Some(explicit) if !explicit.is_empty() => explicit.to_string(),
            _ => Self::decapitalize(&type_info.name),
        };

        if name.is_empty() {
            return Err(ConfigurationError::InvalidName {
                type_name: type_info.full_path.clone(),
            });
        }
        Ok(name)
    }

    /// 字段名转依赖名：`order_service` -> `orderService`
    pub fn field_to_bean_name(field: &str) -> String {
        let mut result = String::with_capacity(field.len());
        let mut upper_next = false;

        for ch in field.trim_start_matches('_').chars() {
            if ch == '_' {
                upper_next = true;
            } else if upper_next {
                result.extend(ch.to_uppercase());
                upper_next = false;
            } else {
                result.push(ch);
            }
        }

        result
    }

    /// 规范化命名空间：接受点分或 `::` 分隔形式
    pub fn normalize_namespace(namespace: &str) -> String {
        namespace
            .trim()
            .trim_matches('.')
            .trim_matches(':')
            .replace('.', "::")
    }

    /// 类型是否位于命名空间（含子命名空间）之下；空命名空间匹配全部类型
    pub fn in_namespace(type_info: &TypeInfo, namespace: &str) -> bool {
        let namespace = Self::normalize_namespace(namespace);
        if namespace.is_empty() {
            return true;
        }

        let module_path = type_info.module_path();
        module_path == namespace
            || module_path
                .strip_prefix(namespace.as_str())
                .is_some_and(|rest| rest.starts_with("::"))
    }
}
