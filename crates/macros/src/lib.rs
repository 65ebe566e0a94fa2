/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemEnum, ItemFn};

/// Logs how long the annotated function took, at debug level, under the function's name.
///
/// Works on both sync and async functions and keeps the original visibility.
#[proc_macro_attribute]
pub fn measure_duration(_: TokenStream, input: TokenStream) -> TokenStream {
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = parse_macro_input!(input as ItemFn);
    let fn_name = &sig.ident;

    let body = match sig.asyncness {
        Some(_) => quote! { async move #block.await },
        None => quote! { (move || #block)() },
    };

    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            let start_time = std::time::Instant::now();
            let result = #body;
            tracing::debug!(
                tag = "[Duration]",
                function = stringify!(#fn_name),
                duration_ms = start_time.elapsed().as_millis() as u64
            );
            result
        }
    };

    TokenStream::from(expanded)
}

/// Turns a plain enum into an application error type.
///
/// Every variant gets a `thiserror` display string equal to its SCREAMING_SNAKE_CASE name,
/// and the enum gets a `code()` method returning that same string.
#[proc_macro_attribute]
pub fn add_error(_: TokenStream, input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as ItemEnum);
    let enum_name = &input.ident;
    let enum_attrs = &input.attrs;
    let vis = &input.vis;

    let variants = input.variants.iter().map(|variant| {
        let variant_attrs = &variant.attrs;
        let variant_name = &variant.ident;
        let fields = &variant.fields;
        let code = convert_to_screaming_snake_case(&variant_name.to_string());
        quote! {
            #(#variant_attrs)*
            #[error(#code)]
            #variant_name #fields,
        }
    });

    let codes = input.variants.iter().map(|variant| {
        let variant_name = &variant.ident;
        let code = convert_to_screaming_snake_case(&variant_name.to_string());
        quote! {
            #enum_name::#variant_name { .. } => #code,
        }
    });

    let expanded = quote! {
        #(#enum_attrs)*
        #[derive(Debug, serde::Serialize, thiserror::Error)]
        #vis enum #enum_name {
            #(#variants)*
        }

        impl #enum_name {
            pub fn code(&self) -> String {
                match self {
                    #(#codes)*
                }
                .to_string()
            }
        }
    };

    TokenStream::from(expanded)
}

fn convert_to_screaming_snake_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 4);
    let mut last_char_was_upper = false;

    for c in input.chars() {
        if c.is_uppercase() {
            if !last_char_was_upper && !result.is_empty() {
                result.push('_');
            }
            last_char_was_upper = true;
        } else {
            last_char_was_upper = false;
        }
        result.push(c.to_ascii_uppercase());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::convert_to_screaming_snake_case;

    #[test]
    fn variant_names_become_error_codes() {
        assert_eq!(
            convert_to_screaming_snake_case("UnprocessibleRequest"),
            "UNPROCESSIBLE_REQUEST"
        );
        assert_eq!(
            convert_to_screaming_snake_case("InvalidCredentials"),
            "INVALID_CREDENTIALS"
        );
        assert_eq!(convert_to_screaming_snake_case("Forbidden"), "FORBIDDEN");
    }

    #[test]
    fn consecutive_capitals_stay_together() {
        assert_eq!(convert_to_screaming_snake_case("GPSData"), "GPSDATA");
    }
}
