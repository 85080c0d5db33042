use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, LitInt, parse_macro_input};

/// Derives the `PeripheralGate` trait for enums.
///
/// Each variant names one peripheral and carries a `#[gate(...)]` attribute
/// telling which bus enable register holds its clock gate and at which bit.
///
/// # Example
///
/// ```ignore
/// use tickboot_macros::PeripheralGate;
///
/// #[derive(Copy, Clone, PartialEq, Eq, PeripheralGate)]
/// pub enum L0Peripheral {
///     #[gate(apb2, bit = 0)]
///     Syscfg,
///     #[gate(apb1, bit = 28)]
///     Pwr,
/// }
/// ```
///
/// This generates:
///
/// ```ignore
/// impl PeripheralGate for L0Peripheral {
///     fn gate(&self) -> ClockGate {
///         match self {
///             Self::Syscfg => ClockGate::new(Bus::Apb2, 0),
///             Self::Pwr => ClockGate::new(Bus::Apb1, 28),
///         }
///     }
///
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Syscfg => "Syscfg",
///             Self::Pwr => "Pwr",
///         }
///     }
/// }
/// ```
///
/// # Requirements
///
/// - The type must be an enum with unit variants
/// - Every variant needs exactly one `#[gate(<bus>, bit = <0..=31>)]`
/// - `<bus>` is one of `ahb`, `apb1`, `apb2`, `iop`
#[proc_macro_derive(PeripheralGate, attributes(gate))]
pub fn derive_peripheral_gate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data_enum) => &data_enum.variants,
        _ => {
            return syn::Error::new_spanned(&input, "PeripheralGate can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let mut gate_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new_spanned(
                variant,
                "PeripheralGate can only be derived for enums with unit variants (no fields)",
            )
            .to_compile_error()
            .into();
        }

        let (bus, bit) = match parse_gate(variant) {
            Ok(gate) => gate,
            Err(err) => return err.to_compile_error().into(),
        };

        let variant_name = &variant.ident;
        let variant_str = variant_name.to_string();

        gate_arms.push(quote! {
            Self::#variant_name => ::tickboot::hal::ClockGate::new(::tickboot::hal::Bus::#bus, #bit)
        });
        name_arms.push(quote! {
            Self::#variant_name => #variant_str
        });
    }

    let expanded = quote! {
        impl ::tickboot::hal::PeripheralGate for #name {
            fn gate(&self) -> ::tickboot::hal::ClockGate {
                match self {
                    #(#gate_arms,)*
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms,)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Reads `#[gate(<bus>, bit = N)]` off a variant.
fn parse_gate(variant: &syn::Variant) -> syn::Result<(proc_macro2::Ident, u8)> {
    let mut found = None;

    for attr in variant.attrs.iter().filter(|a| a.path().is_ident("gate")) {
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[gate] attribute"));
        }

        let mut bus = None;
        let mut bit = None;

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("bit") {
                let lit: LitInt = meta.value()?.parse()?;
                let value: u8 = lit.base10_parse()?;
                if value > 31 {
                    return Err(syn::Error::new_spanned(lit, "bit must be in 0..=31"));
                }
                bit = Some(value);
                return Ok(());
            }

            let bus_name = match meta.path.get_ident().map(|i| i.to_string()).as_deref() {
                Some("ahb") => "Ahb",
                Some("apb1") => "Apb1",
                Some("apb2") => "Apb2",
                Some("iop") => "Iop",
                _ => return Err(meta.error("expected one of `ahb`, `apb1`, `apb2`, `iop` or `bit`")),
            };
            bus = Some(format_ident!("{}", bus_name));
            Ok(())
        })?;

        match (bus, bit) {
            (Some(bus), Some(bit)) => found = Some((bus, bit)),
            _ => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "#[gate] needs a bus and a bit, e.g. #[gate(apb1, bit = 28)]",
                ));
            }
        }
    }

    found.ok_or_else(|| {
        syn::Error::new_spanned(
            variant,
            "missing #[gate(<bus>, bit = N)] attribute on PeripheralGate variant",
        )
    })
}
