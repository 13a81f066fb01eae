//! Implements `#[derive(Packet)]`.
//!
//! Every packet direction is an enum of newtype variants, one per concrete
//! packet struct. The derive generates:
//! - `From<Variant>` for the enum, so translators can emit concrete packets;
//! - `PacketVariant<Enum>` for each concrete struct, which ties the struct
//!   to its kind tag and lets the translator registry borrow it back out;
//! - `Packet` for the enum, exposing the kind tag used as the registry key.
//!
//! The kind enum itself comes from `strum::EnumDiscriminants`; its name is
//! passed with `#[packet(kind = "...")]`.

use darling::{ast, FromDeriveInput, FromField, FromVariant};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DeriveInput, Type};

/// Options on the packet enum.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(packet), supports(enum_newtype))]
struct PacketOptions {
    ident: Ident,
    data: ast::Data<VariantInput, ()>,
    /// Name of the discriminant enum generated by strum.
    kind: Ident,
}

#[derive(Debug, FromVariant)]
#[darling(attributes(packet))]
struct VariantInput {
    ident: Ident,
    fields: ast::Fields<FieldInput>,
}

#[derive(Debug, FromField)]
struct FieldInput {
    ty: Type,
}

pub fn derive_packet_on(input: &DeriveInput) -> syn::Result<TokenStream> {
    let options = match PacketOptions::from_derive_input(input) {
        Ok(options) => options,
        Err(e) => return Ok(e.write_errors()),
    };
    let enum_ident = &options.ident;
    let kind_ident = &options.kind;

    let ast::Data::Enum(variants) = &options.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "only enums are supported",
        ));
    };

    let mut impls = Vec::new();
    for variant in variants {
        let variant_ident = &variant.ident;
        let Some(field) = variant.fields.fields.first() else {
            return Err(syn::Error::new_spanned(
                variant_ident,
                "packet variants must wrap exactly one packet struct",
            ));
        };
        let ty = &field.ty;

        impls.push(quote! {
            impl From<#ty> for #enum_ident {
                fn from(value: #ty) -> Self {
                    Self::#variant_ident(value)
                }
            }

            impl crate::protocol::PacketVariant<#enum_ident> for #ty {
                const KIND: #kind_ident = #kind_ident::#variant_ident;

                #[allow(unreachable_patterns)]
                fn extract(packet: &#enum_ident) -> Option<&Self> {
                    match packet {
                        #enum_ident::#variant_ident(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        });
    }

    Ok(quote! {
        #(#impls)*

        impl crate::protocol::Packet for #enum_ident {
            type Kind = #kind_ident;

            fn kind(&self) -> #kind_ident {
                #kind_ident::from(self)
            }
        }
    })
}
