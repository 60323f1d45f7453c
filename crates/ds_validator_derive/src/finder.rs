use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Fields, GenericParam, Ident, LitStr, Path, Token, TypeParam, WherePredicate,
    parse_quote, punctuated::Punctuated, spanned::Spanned,
};

pub fn derive_error_finder(input: DeriveInput) -> TokenStream {
    // retrieve struct field information
    let fields = match &input.data {
        syn::Data::Struct(data_struct) => &data_struct.fields,
        _ => {
            return syn::Error::new(input.span(), "`ErrorFinder` can only be derived for structs")
                .to_compile_error();
        }
    };

    // determine the field to forward to and its type
    let (forward_access, forward_ty) = match fields {
        // tuple struct: must have exactly one field
        Fields::Unnamed(fields_unnamed) => {
            if fields_unnamed.unnamed.len() != 1 {
                return syn::Error::new(
                    fields_unnamed.span(),
                    "tuple structs must have exactly one field",
                )
                .to_compile_error();
            }
            let ty = &fields_unnamed.unnamed[0].ty;
            (quote! { self.0 }, ty.clone())
        }
        // named struct: require exactly one #[error_finder] attribute
        Fields::Named(fields_named) => {
            let marked_fields: Vec<_> = fields_named
                .named
                .iter()
                .filter(|f| f.attrs.iter().any(|a| a.path().is_ident("error_finder")))
                .collect();

            if marked_fields.len() != 1 {
                let msg = match marked_fields.len() {
                    0 => "no field marked with #[error_finder] attribute",
                    _ => "multiple fields marked with #[error_finder] attribute",
                };
                return syn::Error::new(fields_named.span(), msg).to_compile_error();
            }

            let field_ident = &marked_fields[0].ident;
            let ty = &marked_fields[0].ty;
            (quote! { self.#field_ident }, ty.clone())
        }
        Fields::Unit => {
            return syn::Error::new(
                input.span(),
                "unit structs are not supported by `ErrorFinder` derive",
            )
            .to_compile_error();
        }
    };

    let ident = input.ident;

    // parse error_finder attributes
    let mut crate_name = None;
    let mut finder_name = None;
    let mut user_bounds = Punctuated::<WherePredicate, Token![,]>::new();
    for attr in &input.attrs {
        if !attr.path().is_ident("error_finder") {
            continue;
        }

        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let value = meta.value()?;
                let s: LitStr = value.parse()?;
                crate_name = Some(s.parse::<Path>()?);
                Ok(())
            } else if meta.path.is_ident("name") {
                let value = meta.value()?;
                let s: LitStr = value.parse()?;
                finder_name = Some(s);
                Ok(())
            } else if meta.path.is_ident("bound") {
                let value = meta.value()?;
                let s: LitStr = value.parse()?;
                let predicates =
                    s.parse_with(Punctuated::<WherePredicate, Token![,]>::parse_terminated)?;
                user_bounds.extend(predicates);
                Ok(())
            } else {
                Err(meta.error(
                    "unexpected attribute; supported are `crate`, `name` and `bound`",
                ))
            }
        });

        if let Err(err) = result {
            return err.to_compile_error();
        }
    }
    let base_path = match crate_name {
        Some(path) => quote!(#path::check::finder),
        None => quote!(::ds_validator::check::finder),
    };

    // the type's own generics, plus the datum parameter for the impl
    let (_, ty_generics, _) = input.generics.split_for_impl();
    let datum = Ident::new("__Datum", proc_macro2::Span::call_site());
    let mut generics = input.generics.clone();
    let param: TypeParam = parse_quote!(#datum: ?Sized);
    generics.params.push(GenericParam::Type(param));

    let where_clause = generics.make_where_clause();
    where_clause
        .predicates
        .push(parse_quote!(#forward_ty: #base_path::ErrorFinder<#datum>));
    where_clause.predicates.extend(user_bounds);
    let (impl_generics, _, where_clause) = generics.split_for_impl();

    let name = match finder_name {
        Some(name) => quote! { #name },
        None => quote! { #base_path::ErrorFinder::<#datum>::name(&#forward_access) },
    };

    quote! {
        impl #impl_generics #base_path::ErrorFinder<#datum> for #ident #ty_generics #where_clause {
            fn name(&self) -> &str {
                #name
            }

            fn find(&self, data: &#datum) -> #base_path::ErrorList {
                #base_path::ErrorFinder::<#datum>::find(&#forward_access, data)
            }
        }
    }
}
