use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod finder;

/// Implements `ErrorFinder` by forwarding to a wrapped finder.
///
/// The wrapped finder is the single field of a tuple struct, or the one field marked with
/// `#[error_finder]`. The reported name can be overridden with `#[error_finder(name = "...")]`.
#[proc_macro_derive(ErrorFinder, attributes(error_finder))]
pub fn derive_error_finder(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let expanded = finder::derive_error_finder(input);
    expanded.into()
}
