use syn::DeriveInput;

mod packet;

/// Derives the packet plumbing for a per-direction packet enum.
///
/// See `packet::derive_packet_on` for the generated items.
#[proc_macro_derive(Packet, attributes(packet))]
pub fn derive_packet(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    packet::derive_packet_on(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
