mod expand;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

use crate::expand::expand;

/// Derives `TryFrom<&dbexchange::row::Row>` for a struct whose fields are named after the
/// columns a dynamically described query returns.
///
/// # Example
///
/// ```
/// use dbexchange::row::Row;
/// use dbexchange_derive::FromRow;
///
/// #[derive(FromRow)]
/// struct Person {
///     first_name: String,
///     last_name: String,
/// }
///
/// fn greet(row: &Row) -> Result<(), dbexchange::Error> {
///     let person = Person::try_from(row)?;
///     println!("Hello {} {}!", person.first_name, person.last_name);
///     Ok(())
/// }
/// ```
#[proc_macro_derive(FromRow)]
pub fn derive_from_row(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let output = expand(input);
    proc_macro::TokenStream::from(output)
}
