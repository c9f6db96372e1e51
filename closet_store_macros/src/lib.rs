mod record;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Record)]
// ============================================================================

/// Derive macro for collection records.
///
/// Generates the `closet_store::Record` impl, a `<Name>Patch` struct with one
/// `Option<T>` per mutable field (plus builder-style setters), and field
/// reflection used by the derived-view functions.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Default, Serialize, Deserialize, Record)]
/// #[serde(rename_all = "camelCase")]
/// #[record(collection = "closetItems")]
/// struct ClothingItem {
///     #[record(id)]
///     pub id: String,
///     pub name: String,
///     #[record(flag)]
///     pub needs_washing: bool,
///     #[record(created_at)]
///     pub created_at: Timestamp,
///     #[record(updated_at)]
///     pub updated_at: Timestamp,
/// }
///
/// let patch = ClothingItemPatch::default().name("White T-Shirt");
/// ```
///
/// Field attributes:
/// - `id`: the identifier (defaults to a field named `id`)
/// - `created_at` / `updated_at`: timestamps stamped by the store
/// - `flag`: a `bool` field that `toggle_field` may flip
/// - `skip`: patchable but hidden from field reflection
///
/// Reflected and flag field names follow `#[serde(rename)]` and
/// `#[serde(rename_all = "camelCase")]`; the Rust name is accepted too.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
