mod wire_schema;

/// Derives `wsc_core::schema::WireSchema`, registering the type's layout.
///
/// The layout follows the declaration, which is also the order serde's
/// derive writes fields and numbers variants, so a type deriving both
/// `Serialize` and `WireSchema` encodes to the same bytes either way.
///
/// - structs with named fields keep their field names
/// - tuple structs and tuple variants name their fields `"0"`, `"1"`, ...
/// - unit structs and unit variants have no fields
///
/// ```ignore
/// #[derive(Serialize, Deserialize, WireSchema)]
/// pub struct NestedStruct {
///     pub count: u32,
///     pub note: String,
/// }
///
/// #[derive(Serialize, Deserialize, WireSchema)]
/// pub enum DataEnum {
///     Amount { value: u64 },
///     Name { label: String },
/// }
/// ```
///
/// Generic types and unions are rejected. serde attributes that change the
/// encoded shape (`skip`, `flatten`, `untagged`) are not reflected in the
/// layout and must not be combined with this derive.
#[proc_macro_derive(WireSchema)]
pub fn derive_wire_schema(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(item as syn::DeriveInput);

    wire_schema::derive(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
