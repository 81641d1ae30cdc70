//! Logic for deriving the trait `WireSchema`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{ext::IdentExt, Data, DeriveInput, Fields, Type};

/// Build the `WireSchema` impl for a struct or enum definition.
pub fn derive(input: DeriveInput) -> syn::Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        ..
    } = input;

    if !generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            generics,
            "WireSchema cannot be derived for generic types",
        ));
    }

    let type_id = ident.unraw().to_string();

    let (entry, field_tys) = match data {
        Data::Struct(s) => {
            let (layout, tys) = struct_layout(&s.fields);
            (
                quote! { ::wsc_core::schema::RegistryEntry::Struct(#layout) },
                tys,
            )
        }
        Data::Enum(e) => {
            let mut tys = Vec::new();
            let variants = e
                .variants
                .iter()
                .map(|variant| {
                    let name = variant.ident.unraw().to_string();
                    let (layout, variant_tys) = struct_layout(&variant.fields);
                    tys.extend(variant_tys);

                    quote! { .variant(#name, #layout) }
                })
                .collect::<Vec<_>>();

            (
                quote! {
                    ::wsc_core::schema::RegistryEntry::Enum(
                        ::wsc_core::schema::EnumLayout::new() #(#variants)*
                    )
                },
                tys,
            )
        }
        Data::Union(u) => {
            return Err(syn::Error::new_spanned(
                u.union_token,
                "WireSchema cannot be derived for unions",
            ))
        }
    };

    Ok(quote! {
        impl ::wsc_core::schema::WireSchema for #ident {
            fn type_ref() -> ::wsc_core::schema::TypeRef {
                ::wsc_core::schema::TypeRef::named(#type_id)
            }

            fn register(builder: &mut ::wsc_core::schema::RegistryBuilder) {
                // insert before recursing so self-referencing types terminate
                if builder.insert(#type_id, #entry) {
                    #(<#field_tys as ::wsc_core::schema::WireSchema>::register(builder);)*
                }
            }
        }
    })
}

/// The `StructLayout` expression for a set of fields, and the field types
/// whose entries must be registered alongside it.
fn struct_layout(fields: &Fields) -> (TokenStream, Vec<Type>) {
    let (names, tys): (Vec<String>, Vec<Type>) = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let name = match &field.ident {
                Some(ident) => ident.unraw().to_string(),
                None => i.to_string(),
            };
            (name, field.ty.clone())
        })
        .unzip();

    let layout = quote! {
        ::wsc_core::schema::StructLayout::new()
            #(.field(#names, <#tys as ::wsc_core::schema::WireSchema>::type_ref()))*
    };

    (layout, tys)
}
