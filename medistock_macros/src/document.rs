use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, GenericArgument, LitStr, PathArguments, Type};

pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let collection = extract_collection(&input);

    let id_field = match extract_id_field(&input) {
        Ok(field) => field,
        Err(err) => return err.to_compile_error().into(),
    };
    let id_ident = id_field.ident.clone();

    let (id_body, set_id_body) = if is_option(&id_field.ty) {
        (
            quote! { self.#id_ident.as_deref() },
            quote! { self.#id_ident = ::std::option::Option::Some(id); },
        )
    } else {
        (
            quote! { ::std::option::Option::Some(self.#id_ident.as_str()) },
            quote! { self.#id_ident = id; },
        )
    };

    let expanded = quote! {
        impl medistock::Document for #name {
            const COLLECTION: &'static str = #collection;

            fn id(&self) -> ::std::option::Option<&str> {
                #id_body
            }

            fn set_id(&mut self, id: ::std::string::String) {
                #set_id_body
            }
        }
    };

    TokenStream::from(expanded)
}

fn extract_collection(input: &DeriveInput) -> String {
    let explicit = input
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("document"))
        .find_map(|attr| {
            let mut collection = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    let value: LitStr = meta.value()?.parse()?;
                    collection = Some(value.value());
                }
                Ok(())
            })
            .ok()?;
            collection
        });

    explicit.unwrap_or_else(|| format!("{}s", snake_case(&input.ident.to_string())))
}

fn extract_id_field(input: &DeriveInput) -> syn::Result<Field> {
    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Document derive only supports structs",
        ));
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Document derive requires named fields",
        ));
    };

    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("document") {
                continue;
            }
            let mut is_id = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    is_id = true;
                }
                Ok(())
            })?;
            if is_id {
                return Ok(field.clone());
            }
        }
    }

    fields
        .named
        .iter()
        .find(|field| field.ident.as_ref().is_some_and(|ident| ident == "id"))
        .cloned()
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "Document derive: no field marked with #[document(id)] and no field named `id`",
            )
        })
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    let Some(last) = path.path.segments.last() else {
        return false;
    };
    if last.ident != "Option" {
        return false;
    }
    matches!(
        &last.arguments,
        PathArguments::AngleBracketed(args)
            if matches!(args.args.first(), Some(GenericArgument::Type(_)))
    )
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (index, ch) in name.char_indices() {
        if ch.is_uppercase() && index > 0 {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
    }
    out
}
