use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Meta, parse_macro_input, parse_quote, spanned::Spanned};

/// Derive macro for `FromRow` trait.
///
/// Generates an implementation that matches column names to struct fields and
/// reads each matching column with its field type's `FromColumn` impl.
///
/// # Example
///
/// ```ignore
/// #[derive(FromRow)]
/// struct User {
///     name: String,
///     age: Option<u8>,
/// }
/// ```
///
/// # Strict Mode
///
/// By default, unknown columns are skipped without being decoded. Use
/// `#[from_row(strict)]` to error on unknown columns:
///
/// ```ignore
/// #[derive(FromRow)]
/// #[from_row(strict)]
/// struct User {
///     name: String,
///     age: u8,
/// }
/// ```
#[proc_macro_derive(FromRow, attributes(from_row))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    // the row lifetime goes in front of the struct's own generics
    let mut impl_generics_src = input.generics.clone();
    impl_generics_src.params.insert(0, parse_quote!('__row));
    let (impl_generics, _, _) = impl_generics_src.split_for_impl();
    let (_, ty_generics, where_clause) = input.generics.split_for_impl();

    let strict = input.attrs.iter().any(|attr| {
        if !attr.path().is_ident("from_row") {
            return false;
        }
        match &attr.meta {
            Meta::List(list) => list.tokens.to_string().contains("strict"),
            _ => false,
        }
    });

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "FromRow only supports structs with named fields",
                ));
            }
        },
        _ => return Err(syn::Error::new(input.span(), "FromRow only supports structs")),
    };

    let mut field_names = Vec::with_capacity(fields.len());
    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new(field.span(), "FromRow field without a name"))?;
        field_names.push(ident);
    }
    let field_types: Vec<_> = fields.iter().map(|f| &f.ty).collect();
    let field_name_strs: Vec<_> = field_names
        .iter()
        .map(|n| n.to_string().trim_start_matches("r#").to_string())
        .collect();
    let slots: Vec<_> = field_names
        .iter()
        .map(|n| format_ident!("__slot_{}", n))
        .collect();

    let slot_decls = slots.iter().zip(field_types.iter()).map(|(slot, ty)| {
        quote! {
            let mut #slot: ::core::option::Option<#ty> = ::core::option::Option::None;
        }
    });

    let match_arms = slots
        .iter()
        .zip(field_types.iter())
        .zip(field_name_strs.iter())
        .map(|((slot, ty), name_str)| {
            quote! {
                #name_str => {
                    __decoder.position(__i)?;
                    #slot = ::core::option::Option::Some(
                        <#ty as ::zero_rowcodec::row::FromColumn<'__row>>::from_column(__decoder, __col)?,
                    );
                }
            }
        });

    let fallback_arm = if strict {
        quote! {
            __unknown => {
                return ::core::result::Result::Err(
                    ::zero_rowcodec::error::Error::UnknownColumn(__unknown.to_string()),
                );
            }
        }
    } else {
        quote! {
            _ => {}
        }
    };

    let field_inits = field_names
        .iter()
        .zip(slots.iter())
        .zip(field_name_strs.iter())
        .map(|((name, slot), name_str)| {
            quote! {
                #name: #slot.ok_or(::zero_rowcodec::error::Error::MissingColumn(#name_str))?
            }
        });

    Ok(quote! {
        impl #impl_generics ::zero_rowcodec::row::FromRow<'__row> for #name #ty_generics #where_clause {
            fn from_row<__D: ::zero_rowcodec::RowDecoder<'__row> + ?Sized>(
                __decoder: &mut __D,
            ) -> ::zero_rowcodec::error::Result<Self> {
                #(#slot_decls)*

                let __cols = __decoder.columns();
                for (__i, __col) in __cols.iter().enumerate() {
                    match __col.name.as_str() {
                        #(#match_arms)*
                        #fallback_arm
                    }
                }

                ::core::result::Result::Ok(Self {
                    #(#field_inits),*
                })
            }
        }
    })
}
