//! Type utilities for the derive macro.

use quote::ToTokens;

/// Renders a field type the way it reads in source, for `Property::type_name`.
///
/// Token spacing is dropped except between two word characters, so
/// `HashMap < String , u32 >` becomes `HashMap<String,u32>` while
/// `& 'static str` becomes `&'static str`.
pub(crate) fn type_label(ty: &syn::Type) -> String {
    let rendered = ty.to_token_stream().to_string();
    let chars: Vec<char> = rendered.chars().collect();
    let mut label = String::with_capacity(rendered.len());
    for (position, &ch) in chars.iter().enumerate() {
        if ch != ' ' {
            label.push(ch);
            continue;
        }
        let before = label.chars().next_back();
        let after = chars.get(position + 1).copied();
        if let (Some(before), Some(after)) = (before, after) {
            if is_word(before) && is_word(after) {
                label.push(' ');
            }
        }
    }
    label
}

fn is_word(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn label(tokens: proc_macro2::TokenStream) -> String {
        let ty: syn::Type = syn::parse2(tokens).expect("should parse as Type");
        type_label(&ty)
    }

    #[test]
    fn plain_paths_are_unchanged() {
        assert_eq!(label(quote! { String }), "String");
        assert_eq!(label(quote! { std::time::Duration }), "std::time::Duration");
    }

    #[test]
    fn generic_arguments_are_compacted() {
        assert_eq!(label(quote! { Vec<String> }), "Vec<String>");
        assert_eq!(
            label(quote! { HashMap<String, Vec<u8>> }),
            "HashMap<String,Vec<u8>>"
        );
    }

    #[test]
    fn words_stay_separated() {
        assert_eq!(label(quote! { &'static str }), "&'static str");
        assert_eq!(label(quote! { Box<dyn Fn()> }), "Box<dyn Fn()>");
    }

    #[test]
    fn arrays_keep_their_length() {
        assert_eq!(label(quote! { [u8; 16] }), "[u8;16]");
    }
}
