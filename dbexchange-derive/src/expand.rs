use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

pub fn expand(input: DeriveInput) -> TokenStream {
    let struct_name = input.ident;

    let struct_data = match input.data {
        syn::Data::Struct(struct_data) => struct_data,
        _ => panic!("FromRow can only be derived for structs"),
    };

    let fields = struct_data.fields;

    let field_assignments = fields.iter().map(|field| {
        let field_name = field
            .ident
            .as_ref()
            .expect("All struct members must be named");
        let column_name = field_name.to_string();
        quote! {
            #field_name: dbexchange::row::Row::by_name(row, #column_name)
                .ok_or_else(|| dbexchange::Error::binding(
                    concat!("column '", #column_name, "' missing from described row")
                ))?
                .get()
                .unwrap_or_else(|| Err(dbexchange::Error::binding(
                    concat!("column '", #column_name, "' was NULL")
                )))?,
        }
    });

    quote! {
        impl std::convert::TryFrom<&dbexchange::row::Row> for #struct_name {
            type Error = dbexchange::Error;

            fn try_from(row: &dbexchange::row::Row) -> std::result::Result<Self, Self::Error> {
                Ok(#struct_name {
                    #(#field_assignments)*
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proc_macro2::TokenStream;
    use quote::quote;
    use syn::{parse2, DeriveInput};

    use super::expand;

    #[test]
    fn derive_from_row_for_struct() {
        let input = given(quote! {
            struct Person {
                first_name: String,
            }
        });

        let output = expand(input);

        let expected = quote! {
            impl std::convert::TryFrom<&dbexchange::row::Row> for Person {
                type Error = dbexchange::Error;

                fn try_from(row: &dbexchange::row::Row) -> std::result::Result<Self, Self::Error> {
                    Ok(Person {
                        first_name: dbexchange::row::Row::by_name(row, "first_name")
                            .ok_or_else(|| dbexchange::Error::binding(
                                concat!("column '", "first_name", "' missing from described row")
                            ))?
                            .get()
                            .unwrap_or_else(|| Err(dbexchange::Error::binding(
                                concat!("column '", "first_name", "' was NULL")
                            )))?,
                    })
                }
            }
        };
        assert_eq!(expected.to_string(), output.to_string());
    }

    fn given(input: TokenStream) -> DeriveInput {
        parse2(input).unwrap()
    }
}
