extern crate proc_macro;

use proc_macro::TokenStream;

fn status_code(attrs: &[syn::Attribute]) -> syn::Result<Option<u16>> {
    for attr in attrs.iter().filter(|attr| attr.path.is_ident("status_code")) {
        let code = match attr.parse_meta()? {
            syn::Meta::List(list) => match list.nested.first() {
                Some(syn::NestedMeta::Lit(syn::Lit::Int(code))) => code.base10_parse::<u16>()?,
                _ => {
                    return Err(syn::Error::new_spanned(
                        list,
                        "expected #[status_code(NNN)]",
                    ))
                }
            },
            meta => {
                return Err(syn::Error::new_spanned(
                    meta,
                    "expected #[status_code(NNN)]",
                ))
            }
        };
        return Ok(Some(code));
    }
    Ok(None)
}

#[proc_macro_derive(ApiError, attributes(status_code))]
pub fn derive_response_error(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let name = input.ident;

    let arms = match &input.data {
        syn::Data::Enum(data) => data
            .variants
            .iter()
            .map(|variant| {
                let ident = &variant.ident;
                status_code(&variant.attrs)
                    .map(|code| code.map(|code| quote::quote! { Self::#ident { .. } => #code, }))
            })
            .collect::<syn::Result<Vec<_>>>(),
        _ => status_code(&input.attrs)
            .map(|code| vec![code.map(|code| quote::quote! { _ => #code, })]),
    };

    let arms = match arms {
        Ok(arms) => arms.into_iter().flatten().collect::<Vec<_>>(),
        Err(err) => return TokenStream::from(err.to_compile_error()),
    };

    TokenStream::from(quote::quote! {
        impl ::actix_web::ResponseError for #name {
            fn status_code(&self) -> ::actix_web::http::StatusCode {
                #[allow(unreachable_patterns)]
                let code: u16 = match self {
                    #(#arms)*
                    _ => 500,
                };
                ::actix_web::http::StatusCode::from_u16(code)
                    .unwrap_or(::actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
            }

            fn error_response(&self) -> ::actix_web::web::HttpResponse<::actix_web::body::Body> {
                let desc = ::submissions_web_core::ErrorDesc::from(self as &dyn std::error::Error);
                let status_code = self.status_code();
                if status_code.is_server_error() {
                    ::log::error!("{}", desc);
                } else {
                    ::log::debug!("  REJECTED {} {}", status_code.as_u16(), desc);
                }
                ::actix_web::web::HttpResponse::build(status_code).json(desc)
            }
        }
    })
}
