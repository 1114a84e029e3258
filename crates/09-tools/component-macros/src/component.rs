//! `#[derive(Component)]` 展开

use crate::attributes::{AutowiredField, ComponentArgs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

/// 为结构体生成 `ComponentType` 实现
pub fn expand(input: &DeriveInput) -> Result<TokenStream> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Component)] 不支持泛型组件",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "#[derive(Component)] 只能用于结构体",
            ))
        }
    };

    let args = ComponentArgs::from_attributes(&input.attrs)?;
    let autowired = autowired_fields(fields)?;

    let constructor = if args.invocable {
        quote! { ::di_abstractions::ComponentDefinition::invocable::<#ident>() }
    } else {
        quote! { ::di_abstractions::ComponentDefinition::of::<#ident>() }
    };

    let name = args.name.as_ref().map(|name| quote! { .named(#name) });

    let dependencies = autowired.iter().map(|field| {
        let field_ident = &field.ident;
        let field_name = field_ident.to_string();
        let bean_name = &field.bean_name;
        let required = field.required;
        quote! {
            .depends_on(
                ::di_abstractions::DependencyDescriptor::field(
                    #bean_name,
                    #field_name,
                    |bean: &#ident| &bean.#field_ident,
                )
                .with_required(#required),
            )
        }
    });

    let init = args
        .init
        .as_ref()
        .map(|method| quote! { .with_init(|bean: &#ident| #ident::#method(bean)) });
    let destroy = args
        .destroy
        .as_ref()
        .map(|method| quote! { .with_destroy(|bean: &#ident| #ident::#method(bean)) });
    let aspect = args
        .aspect
        .as_ref()
        .map(|function| quote! { .aspect(#ident::#function()) });

    let registration = args.register.then(|| {
        quote! {
            ::di_abstractions::inventory::submit! {
                ::di_abstractions::ComponentRegistration::of::<#ident>()
            }
        }
    });

    Ok(quote! {
        impl ::di_abstractions::ComponentType for #ident {
            fn definition() -> ::di_abstractions::ComponentDefinition {
                #constructor
                    #name
                    #(#dependencies)*
                    #init
                    #destroy
                    #aspect
            }
        }

        #registration
    })
}

fn autowired_fields(fields: &Fields) -> Result<Vec<AutowiredField>> {
    let mut result = Vec::new();
    let mut errors: Option<syn::Error> = None;

    for field in fields {
        match AutowiredField::from_field(field) {
            Ok(Some(autowired)) => result.push(autowired),
            Ok(None) => {}
            Err(error) => match errors.as_mut() {
                Some(existing) => existing.combine(error),
                None => errors = Some(error),
            },
        }
    }

    match errors {
        Some(error) => Err(error),
        None => Ok(result),
    }
}
