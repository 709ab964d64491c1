use convert_case::{Case, Casing};
use darling::{FromDeriveInput, FromField, ast::Data, util::Flag};
use proc_macro_error2::{abort, emit_error};
use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{DeriveInput, Ident, parse2};

#[derive(FromField, Debug, Clone)]
#[darling(attributes(docket))]
struct DeriveEntityField {
    ident: Option<Ident>,
    column: Option<String>,
    primary_key: Flag,
}

#[derive(FromDeriveInput)]
#[darling(attributes(docket), supports(struct_named))]
struct DeriveEntityTarget {
    ident: Ident,
    generics: syn::Generics,
    table: Option<String>,
    data: Data<(), DeriveEntityField>,
}

struct TargetColumn {
    field_ident: Ident,
    db_name: String,
    primary_key: bool,
}

pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match parse2(input) {
        Ok(e) => e,
        Err(e) => return e.to_compile_error(),
    };

    let target = match DeriveEntityTarget::from_derive_input(&input) {
        Ok(r) => r,
        Err(e) => return e.write_errors(),
    };

    if !target.generics.params.is_empty() {
        abort! {
            target.generics, "Generic entities are not supported.";
            note = "An entity maps to exactly one table, declare one struct per table.";
        };
    }

    let Some(struct_data) = target.data.take_struct() else {
        abort! {
            input, "Target is not a struct.";
            note = "This macro must be run on a struct.";
        };
    };

    let columns = struct_data
        .fields
        .iter()
        .map(|e| {
            let Some(ident) = &e.ident else {
                abort! {
                    e.ident, "Field has no ident.";
                    note = "This macro cannot be run on tuple structs.";
                };
            };

            TargetColumn {
                field_ident: ident.clone(),
                db_name: e.column.clone().unwrap_or_else(|| ident.to_string()),
                primary_key: e.primary_key.is_present(),
            }
        })
        .collect::<Vec<_>>();

    if columns.is_empty() {
        abort! {
            input, "Entity has no fields.";
            note = "Every entity needs at least one column.";
        };
    }

    // Make sure all columns have unique names.
    if let Some(duplicate) = columns
        .iter()
        .find(|e| columns.iter().filter(|o| e.db_name.eq(&o.db_name)).count() > 1)
    {
        columns.iter().for_each(|e| {
            if columns.iter().filter(|o| e.db_name.eq(&o.db_name)).count() > 1 {
                emit_error! {
                    e.field_ident.span(), "Clashing occurrence of \"{}\" here.", e.db_name
                };
            }
        });

        abort! {
            duplicate.field_ident.span(), "Duplicate column definition \"{}\"", duplicate.db_name;
            note = "Columns must have unique names, if necessary use the #[docket(column = \"my_column_name\")] attribute to specify a unique name.";
        }
    }

    let entity_ident = &target.ident;

    let table_name = target
        .table
        .unwrap_or_else(|| target.ident.to_string().to_case(Case::Snake));

    let column_decls = columns.iter().map(|e| {
        let field_name = e.field_ident.to_string();
        let db_name = &e.db_name;
        let primary_key = e.primary_key;

        quote! {
            ::docket::entity::ColumnDescriptor {
                field_name: #field_name,
                column_name: #db_name,
                is_primary_key: #primary_key,
            }
        }
    });

    let slot_exprs = columns.iter().map(|e| {
        let field_ident = &e.field_ident;

        quote! {
            ::docket::entity::value::FieldValue::to_slot(&self.#field_ident)
        }
    });

    let field_assignments = columns.iter().enumerate().map(|(i, e)| {
        let field_ident = &e.field_ident;
        let index = Literal::usize_unsuffixed(i);

        quote! {
            #index => self.#field_ident = ::docket::entity::value::FieldValue::read(row, column)?,
        }
    });

    quote! {
        impl ::docket::entity::Entity for #entity_ident {
            const TABLE_NAME: &'static str = #table_name;

            const COLUMNS: &'static [::docket::entity::ColumnDescriptor] = &[
                #(#column_decls),*
            ];

            fn slots(&self) -> ::std::vec::Vec<::docket::entity::value::Slot> {
                ::std::vec![
                    #(#slot_exprs),*
                ]
            }

            fn assign(
                &mut self,
                index: usize,
                row: &::docket::sqlx::any::AnyRow,
                column: &::docket::entity::ColumnDescriptor,
            ) -> ::docket::Result<()> {
                match index {
                    #(
                        #field_assignments
                    )*
                    _ => return ::std::result::Result::Err(
                        ::docket::entity::unknown_column::<Self>(index),
                    ),
                }

                ::std::result::Result::Ok(())
            }
        }
    }
}
