mod document;

use proc_macro::TokenStream;

/// Derive macro for the `Document` trait.
///
/// # Usage
///
/// ```ignore
/// use medistock::Document;
///
/// #[derive(Clone, Serialize, Deserialize, Document)]
/// #[document(collection = "medicines")]
/// pub struct Item {
///     #[document(id)]
///     pub id: Option<String>,
///     pub name: String,
/// }
/// ```
///
/// - `#[document(collection = "...")]` sets the gateway collection name.
///   If omitted, defaults to snake_case struct name + "s".
/// - `#[document(id)]` marks the field holding the backend identifier.
///   If omitted, defaults to a field named `id`. Both `Option<String>`
///   (assigned on first persist) and `String` fields are accepted.
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document(input)
}
