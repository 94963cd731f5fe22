use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote, quote_spanned};
use std::path::Path;
use syn::spanned::Spanned;

/// Records the interactions of the annotated test against the configured domain name.
///
/// ```ignore
/// #[servirtium_record_test("playback_data/create_token.md", configure)]
/// fn create_token(base_url: &str) { /* talk to base_url */ }
/// ```
#[proc_macro_attribute]
pub fn servirtium_record_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    servirtium_test(attrs, item, quote! { servirtium::ServirtiumMode::Record })
}

/// Replays a markdown recording to the annotated test.
#[proc_macro_attribute]
pub fn servirtium_playback_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    servirtium_test(attrs, item, quote! { servirtium::ServirtiumMode::Playback })
}

fn servirtium_test(
    attrs: TokenStream,
    item: TokenStream,
    enum_variant: proc_macro2::TokenStream,
) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    let attributes = &input.attrs;
    let visibility = &input.vis;
    let signature = &input.sig;
    let block = &input.block;

    let markdown_name: String;

    if args.len() < 2 {
        return quote! {
            compile_error!("A markdown name and a configuration function should be passed to the macro");
        }
        .into();
    }

    if let syn::NestedMeta::Lit(syn::Lit::Str(parsed_markdown_name)) = &args[0] {
        markdown_name = parsed_markdown_name.value();
        if let Err(stream) = validate_markdown_path(&markdown_name, parsed_markdown_name.span()) {
            return stream.into();
        }
    } else {
        return quote! {
            compile_error!("The first argument should be a string literal!");
        }
        .into();
    }

    let configuration_function;
    if let syn::NestedMeta::Meta(syn::Meta::Path(function_path)) = &args[1] {
        configuration_function = function_path;
    } else {
        let error = quote! {
            compile_error!("The second argument should be a configuration function!");
        };

        return error.into();
    }

    if signature.inputs.len() != 1 {
        return quote_spanned! {signature.inputs.span()=>
            compile_error!("The test function should take exactly one argument: the base url of the Servirtium server");
        }
        .into();
    }

    let test_name = &signature.ident;
    let body_name = format_ident!("__servirtium_{}_body", test_name);
    let inputs = &signature.inputs;
    let return_type = &signature.output;

    let output = quote! {
        #[test]
        #(#attributes)*
        #visibility fn #test_name() {
            fn #body_name(#inputs) #return_type #block

            let mut __servirtium_configuration =
                servirtium::ServirtiumConfiguration::new(#enum_variant, #markdown_name);
            #configuration_function(&mut __servirtium_configuration);

            let __servirtium_server =
                match servirtium::ServirtiumServer::start(__servirtium_configuration) {
                    Ok(server) => server,
                    Err(e) => panic!("Servirtium Error: {}", e),
                };
            let __servirtium_base_url = __servirtium_server.base_url();

            let __servirtium_outcome =
                std::panic::catch_unwind(|| #body_name(&__servirtium_base_url));
            let __servirtium_finished = __servirtium_server.finish();

            if let Err(e) = __servirtium_outcome {
                std::panic::resume_unwind(e);
            }
            if let Err(e) = __servirtium_finished {
                panic!("Servirtium Error: {}", e);
            }
        }
    };

    TokenStream::from(output)
}

fn validate_markdown_path<P: AsRef<Path>>(
    path: P,
    span: Span,
) -> Result<(), proc_macro2::TokenStream> {
    if !path.as_ref().to_string_lossy().ends_with(".md") {
        return Err(quote_spanned! {span=>
            compile_error!("The path should point to a .md file!");
        });
    }

    Ok(())
}
