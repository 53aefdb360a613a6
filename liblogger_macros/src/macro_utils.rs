use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{ItemFn, ReturnType, Type};

pub fn get_fn_name(func: &ItemFn) -> String {
    func.sig.ident.to_string()
}

/// Return type annotation for the closure that wraps the original body.
///
/// `?` inside the body needs the closure's return type spelled out; `impl
/// Trait` cannot be written there, so those bodies are left to inference.
pub fn closure_return(func: &ItemFn) -> TokenStream2 {
    match &func.sig.output {
        ReturnType::Default => quote!(-> ()),
        ReturnType::Type(_, ty) if contains_impl_trait(ty) => quote!(),
        ReturnType::Type(_, ty) => quote!(-> #ty),
    }
}

/// Whether the declared return type is spelled `Result<..>` (any path ending
/// in `Result`, so crate aliases count).
pub fn returns_result(func: &ItemFn) -> bool {
    match &func.sig.output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .map_or(false, |segment| segment.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    }
}

fn contains_impl_trait(ty: &Type) -> bool {
    quote!(#ty).to_string().contains("impl ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn result_aliases_are_detected() {
        let func: ItemFn = parse_quote! {
            fn load(path: &str) -> crate::error::Result<Engine> { todo!() }
        };
        assert!(returns_result(&func));
        assert_eq!(get_fn_name(&func), "load");
    }

    #[test]
    fn unit_and_impl_returns() {
        let unit: ItemFn = parse_quote! { fn tick() {} };
        assert!(!returns_result(&unit));
        assert_eq!(closure_return(&unit).to_string(), "-> ()");

        let opaque: ItemFn = parse_quote! {
            fn lines(&self) -> impl Iterator<Item = String> { std::iter::empty() }
        };
        assert!(closure_return(&opaque).is_empty());
    }
}
