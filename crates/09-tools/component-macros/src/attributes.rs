//! 派生宏属性解析

use infrastructure_common::NamingConventions;
use syn::{Attribute, Field, Ident, LitBool, LitStr, Result};

/// `#[component(...)]` 参数
#[derive(Debug, Default)]
pub struct ComponentArgs {
    /// 显式组件名称
    pub name: Option<String>,
    /// 初始化方法
    pub init: Option<Ident>,
    /// 销毁方法
    pub destroy: Option<Ident>,
    /// 返回切面声明的关联函数
    pub aspect: Option<Ident>,
    /// 是否暴露可调用接口
    pub invocable: bool,
    /// 是否提交链接期登记
    pub register: bool,
}

impl ComponentArgs {
    /// 从结构体属性中解析，允许多个 `#[component]`
    pub fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let mut args = ComponentArgs::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("component")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let name: LitStr = meta.value()?.parse()?;
                    if name.value().trim().is_empty() {
                        return Err(meta.error("组件名称不能为空"));
                    }
                    args.name = Some(name.value());
                } else if meta.path.is_ident("init") {
                    args.init = Some(method_ident(&meta.value()?.parse()?)?);
                } else if meta.path.is_ident("destroy") {
                    args.destroy = Some(method_ident(&meta.value()?.parse()?)?);
                } else if meta.path.is_ident("aspect") {
                    args.aspect = Some(method_ident(&meta.value()?.parse()?)?);
                } else if meta.path.is_ident("invocable") {
                    args.invocable = true;
                } else if meta.path.is_ident("register") {
                    args.register = true;
                } else {
                    return Err(meta.error(
                        "未知的 component 参数，可用: name, init, destroy, aspect, invocable, register",
                    ));
                }
                Ok(())
            })?;
        }

        Ok(args)
    }
}

/// 被 `#[autowired]` 标记的字段
#[derive(Debug)]
pub struct AutowiredField {
    /// 字段标识符
    pub ident: Ident,
    /// 依赖的组件名称
    pub bean_name: String,
    /// 是否必需
    pub required: bool,
}

impl AutowiredField {
    /// 解析字段；没有 `#[autowired]` 时返回 `None`
    pub fn from_field(field: &Field) -> Result<Option<Self>> {
        let Some(attr) = field.attrs.iter().find(|attr| attr.path().is_ident("autowired")) else {
            return Ok(None);
        };

        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "#[autowired] 只能用于具名字段"));
        };

        let mut bean_name = None;
        let mut required = true;

        // 裸 `#[autowired]` 没有参数列表
        if !matches!(attr.meta, syn::Meta::Path(_)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let name: LitStr = meta.value()?.parse()?;
                    bean_name = Some(name.value());
                } else if meta.path.is_ident("required") {
                    let value: LitBool = meta.value()?.parse()?;
                    required = value.value;
                } else if meta.path.is_ident("optional") {
                    required = false;
                } else {
                    return Err(meta.error("未知的 autowired 参数，可用: name, required, optional"));
                }
                Ok(())
            })?;
        }

        let bean_name = match bean_name {
            Some(name) if !name.trim().is_empty() => name,
            Some(_) => return Err(syn::Error::new_spanned(attr, "依赖名称不能为空")),
            None => NamingConventions::field_to_bean_name(&ident.to_string()),
        };

        Ok(Some(Self {
            ident,
            bean_name,
            required,
        }))
    }
}

fn method_ident(lit: &LitStr) -> Result<Ident> {
    lit.parse::<Ident>()
        .map_err(|_| syn::Error::new_spanned(lit, "需要方法名，例如 \"start\""))
}
