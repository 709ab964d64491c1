mod entity;

use entity::derive_entity;
use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;

/// Implement `docket::Entity` for a struct with named fields.
///
/// ```rust,ignore
/// #[derive(Entity, Default)]
/// #[docket(table = "Events")]
/// pub struct Event {
///     #[docket(primary_key)]
///     pub event_id: Option<String>,
///     #[docket(column = "app_key")]
///     pub app_id: Option<String>,
/// }
/// ```
///
/// The table defaults to the struct name in snake_case and every column to its field name.
#[proc_macro_error]
#[proc_macro_derive(Entity, attributes(docket))]
pub fn entity(input: TokenStream) -> TokenStream {
    derive_entity(input.into()).into()
}
