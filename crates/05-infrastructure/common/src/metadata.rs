//! 元数据定义
//!
//! 提供组件类型的元数据信息

use std::any::TypeId;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 简单名称（不含模块路径与泛型参数）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径，如 `example_app::service::UserService`
    pub full_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full_path = std::any::type_name::<T>();
        let base = full_path.split('<').next().unwrap_or(full_path);
        Self {
            name: base.rsplit("::").next().unwrap_or(base).to_string(),
            id: TypeId::of::<T>(),
            full_path: full_path.to_string(),
        }
    }

    /// 类型所在的模块路径
    pub fn module_path(&self) -> &str {
        let base = self.base_path();
        match base.rfind("::") {
            Some(index) => &base[..index],
            None => "",
        }
    }

    /// 点分形式的类型全名，如 `example_app.service.UserService`
    pub fn dotted_path(&self) -> String {
        self.base_path().replace("::", ".")
    }

    fn base_path(&self) -> &str {
        self.full_path.split('<').next().unwrap_or(&self.full_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod service {
        pub struct UserService;
    }

    #[test]
    fn test_type_info_names() {
        let info = TypeInfo::of::<service::UserService>();

        assert_eq!(info.name, "UserService");
        assert!(info.module_path().ends_with("metadata::tests::service"));
        assert!(info.dotted_path().ends_with("metadata.tests.service.UserService"));
    }

    #[test]
    fn test_generic_type_uses_base_name() {
        let info = TypeInfo::of::<Vec<String>>();
        assert_eq!(info.name, "Vec");
        assert_eq!(info.dotted_path(), "alloc.vec.Vec");
    }
}
