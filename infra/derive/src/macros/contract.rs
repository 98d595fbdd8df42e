use heck::ToUpperCamelCase;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitBool, LitStr};

/// Type-level `#[contract(...)]` arguments.
#[derive(Default)]
struct TypeArgs {
    skip_null: Option<bool>,
    skip_default: Option<bool>,
    ignore_cycles: Option<bool>,
}

/// Field-level `#[contract(...)]` arguments.
#[derive(Default)]
struct FieldArgs {
    rename: Option<LitStr>,
    date_only: bool,
    skip: bool,
}

struct ContractField<'a> {
    ident: &'a Ident,
    args: FieldArgs,
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Contract cannot be derived for generic types; the field table is a single static",
        ));
    }

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, "Contract can only be derived for structs"));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "Contract requires a struct with named fields",
        ));
    };

    let type_args = parse_type_args(&input.attrs)?;
    let fields = named
        .named
        .iter()
        .map(|field| {
            let ident = field.ident.as_ref().ok_or_else(|| {
                syn::Error::new(field.span(), "Contract requires named fields")
            })?;
            Ok(ContractField { ident, args: parse_field_args(&field.attrs)? })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let members: Vec<&ContractField<'_>> = fields.iter().filter(|f| !f.args.skip).collect();

    let descriptors = members.iter().map(|field| field_descriptor(field));
    let policies = policy_overrides(&type_args);

    let indices: Vec<usize> = (0..members.len()).collect();
    let member_idents: Vec<&Ident> = members.iter().map(|f| f.ident).collect();

    let constructors = fields.iter().map(|field| {
        let ident = field.ident;
        if field.args.skip {
            return quote! { #ident: ::core::default::Default::default() };
        }
        let index = members.iter().position(|m| m.ident == ident).unwrap_or_default();
        quote! { #ident: reader.member(#index)? }
    });

    let descriptor_ident = format_ident!("__{}_CONTRACT", name.to_string().to_uppercase());

    Ok(quote! {
        #[allow(non_upper_case_globals)]
        const _: () = {
            static #descriptor_ident: ::polycase_contract::TypeDescriptor =
                ::polycase_contract::TypeDescriptor {
                    type_name: concat!(module_path!(), "::", stringify!(#name)),
                    fields: &[#(#descriptors),*],
                    policies: #policies,
                };

            #[automatically_derived]
            impl ::polycase_contract::Describe for #name {
                #[inline]
                fn descriptor() -> &'static ::polycase_contract::TypeDescriptor {
                    &#descriptor_ident
                }
            }

            #[automatically_derived]
            impl ::polycase_contract::ContractObject for #name {
                fn write_member(
                    &self,
                    index: usize,
                    cx: &mut ::polycase_contract::SerializeContext<'_>,
                    transform: ::core::option::Option<::polycase_contract::ValueTransform>,
                ) -> ::core::result::Result<
                    ::core::option::Option<::polycase_contract::Value>,
                    ::polycase_contract::ContractError,
                > {
                    match index {
                        #(#indices => ::polycase_contract::ContractValue::write(&self.#member_idents, cx, transform),)*
                        _ => ::core::result::Result::Ok(::core::option::Option::None),
                    }
                }

                fn member_is_default(&self, index: usize) -> bool {
                    match index {
                        #(#indices => ::polycase_contract::ContractValue::is_default_value(&self.#member_idents),)*
                        _ => false,
                    }
                }

                fn from_members(
                    reader: &::polycase_contract::MemberReader<'_>,
                ) -> ::core::result::Result<Self, ::polycase_contract::ContractError> {
                    ::core::result::Result::Ok(Self { #(#constructors),* })
                }
            }

            #[automatically_derived]
            impl ::polycase_contract::ContractValue for #name {
                #[inline]
                fn write(
                    &self,
                    cx: &mut ::polycase_contract::SerializeContext<'_>,
                    _transform: ::core::option::Option<::polycase_contract::ValueTransform>,
                ) -> ::core::result::Result<
                    ::core::option::Option<::polycase_contract::Value>,
                    ::polycase_contract::ContractError,
                > {
                    cx.write_object(self)
                }

                #[inline]
                fn read(
                    value: &::polycase_contract::Value,
                    cx: &::polycase_contract::DeserializeContext<'_>,
                    _transform: ::core::option::Option<::polycase_contract::ValueTransform>,
                ) -> ::core::result::Result<Self, ::polycase_contract::ContractError> {
                    cx.read_object(value)
                }
            }
        };
    })
}

fn field_descriptor(field: &ContractField<'_>) -> TokenStream {
    let identifier = field.ident.unraw().to_string().to_upper_camel_case();
    let rename = field.args.rename.as_ref().map_or_else(
        || quote! { ::core::option::Option::None },
        |lit| quote! { ::core::option::Option::Some(#lit) },
    );
    let transform = if field.args.date_only {
        quote! { ::core::option::Option::Some(::polycase_contract::ValueTransform::DateOnly) }
    } else {
        quote! { ::core::option::Option::None }
    };

    quote! {
        ::polycase_contract::FieldDescriptor {
            identifier: #identifier,
            rename: #rename,
            transform: #transform,
        }
    }
}

fn policy_overrides(args: &TypeArgs) -> TokenStream {
    let opt = |value: Option<bool>| {
        value.map_or_else(
            || quote! { ::core::option::Option::None },
            |v| quote! { ::core::option::Option::Some(#v) },
        )
    };
    let skip_null = opt(args.skip_null);
    let skip_default = opt(args.skip_default);
    let ignore_cycles = opt(args.ignore_cycles);

    quote! {
        ::polycase_contract::PolicyOverrides {
            skip_null: #skip_null,
            skip_default: #skip_default,
            ignore_reference_cycles: #ignore_cycles,
        }
    }
}

fn parse_type_args(attrs: &[Attribute]) -> syn::Result<TypeArgs> {
    let mut args = TypeArgs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("contract")) {
        attr.parse_nested_meta(|meta| {
            let slot = if meta.path.is_ident("skip_null") {
                &mut args.skip_null
            } else if meta.path.is_ident("skip_default") {
                &mut args.skip_default
            } else if meta.path.is_ident("ignore_cycles") {
                &mut args.ignore_cycles
            } else {
                return Err(meta.error(
                    "unsupported argument; expected skip_null, skip_default or ignore_cycles",
                ));
            };
            if slot.is_some() {
                return Err(meta.error("duplicate argument"));
            }
            let value: LitBool = meta.value()?.parse()?;
            *slot = Some(value.value);
            Ok(())
        })?;
    }

    Ok(args)
}

fn parse_field_args(attrs: &[Attribute]) -> syn::Result<FieldArgs> {
    let mut args = FieldArgs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("contract")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if args.rename.is_some() {
                    return Err(meta.error("duplicate rename"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().trim().is_empty() {
                    return Err(syn::Error::new_spanned(&lit, "rename cannot be empty"));
                }
                args.rename = Some(lit);
                return Ok(());
            }
            if meta.path.is_ident("date_only") {
                args.date_only = true;
                return Ok(());
            }
            if meta.path.is_ident("skip") {
                args.skip = true;
                return Ok(());
            }
            Err(meta.error("unsupported argument; expected rename, date_only or skip"))
        })?;
    }

    if args.skip && (args.rename.is_some() || args.date_only) {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "skipped fields cannot carry rename or date_only",
        ));
    }

    Ok(args)
}
