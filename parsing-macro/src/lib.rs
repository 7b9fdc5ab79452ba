use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    braced, bracketed, meta::ParseNestedMeta, parse::Parse, parse_macro_input, token::Comma,
    Attribute, Expr, Field, Generics, Ident, Token, Visibility,
};

enum ParsingDirective {
    Ignore { typ: syn::Type },
    Padding { num_bytes: syn::Expr },
    Param { typ: syn::Type, name: syn::Ident },
}

/*

pub struct Header {
    pub field1: u16,
    [[padding_bytes = 4]]
    pub field2: u8,
    [[padding_bytes = 40]]
    [[param: u8 = string_len]]
}
*/

struct DoubleBracketedInput {
    ident: syn::Ident,
}

impl DoubleBracketedInput {
    fn parse_nested(
        input: syn::parse::ParseStream,
        f: impl FnOnce(Self, syn::parse::ParseStream),
    ) -> syn::Result<()> {
        let bracketed_input;
        bracketed!(bracketed_input in input);
        let input = bracketed_input;
        let bracketed_input;
        bracketed!(bracketed_input in input);
        let input = bracketed_input;

        let ident = input.parse::<Ident>()?;

        f(Self { ident }, &input);
        Ok(())
    }
}

impl ParsingDirective {
    fn parse_from_double_brackets(
        br: &DoubleBracketedInput,
        input: syn::parse::ParseStream,
    ) -> syn::Result<Self> {
        match br.ident.to_string().as_str() {
            "padding_bytes" => {
                input.parse::<Token![=]>()?;
                let num_bytes: syn::Expr = input.parse()?;
                Ok(Self::Padding { num_bytes })
            }
            "ignore" => {
                input.parse::<Token![:]>()?;
                let typ: syn::Type = input.parse()?;
                Ok(Self::Ignore { typ })
            }
            "param" => {
                input.parse::<Token![:]>()?;
                let typ: syn::Type = input.parse()?;
                input.parse::<Token![=]>()?;
                let name: syn::Ident = input.parse()?;
                Ok(Self::Param { typ, name })
            }
            _ => Err(syn::Error::new(
                br.ident.span(),
                "expected `padding_bytes`, `ignore` or `param`",
            )),
        }
    }

    fn as_tokens(&self, endianess: &proc_macro2::TokenStream) -> proc_macro2::TokenStream {
        match self {
            ParsingDirective::Padding { num_bytes } => {
                quote! {
                    input.skip(#num_bytes as usize)?;
                }
            }
            ParsingDirective::Param { typ, name } => {
                quote! {
                    let #name = input.read_type::<#endianess, #typ>()?;
                }
            }
            ParsingDirective::Ignore { typ } => {
                quote! {
                    input.read_type::<#endianess, #typ>()?;
                }
            }
        }
    }
}

struct FieldStruct {
    name: Ident,
    read_type: syn::Type,
    option: Option<syn::Expr>,
    e: FieldEnum,
}

enum FieldEnum {
    Normal,
    LengthPrefixedString,
    SizedBuf(syn::Expr),
    Collection {
        field_ty: syn::Type,
        num_elems: syn::Expr,
    },
}

impl FieldStruct {
    fn from_field(field: &Field) -> syn::Result<Self> {
        let name = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(Span::call_site(), "only named fields can be parsed"))?;
        Ok(Self {
            name,
            read_type: field.ty.clone(),
            option: None,
            e: FieldEnum::Normal,
        })
    }

    /*
    #[parse(string, option_if: String = (flags & 1) != 0)]
     */
    fn apply_meta(&mut self, field_ty: &syn::Type, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("string") {
            self.e = FieldEnum::LengthPrefixedString;
        } else if meta.path.is_ident("sized_buf") {
            let size = meta.value()?.parse::<Expr>()?;
            self.e = FieldEnum::SizedBuf(size);
        } else if meta.path.is_ident("collection") {
            meta.input.parse::<Token![:]>()?;
            let ty = meta.input.parse::<syn::Type>()?;
            meta.input.parse::<Token![=]>()?;
            let num_elems = meta.input.parse::<Expr>()?;
            self.read_type = ty;
            self.e = FieldEnum::Collection {
                field_ty: field_ty.clone(),
                num_elems,
            };
        } else if meta.path.is_ident("option_if") {
            meta.input.parse::<Token![:]>()?;
            let ty = meta.input.parse::<syn::Type>()?;
            meta.input.parse::<Token![=]>()?;
            let if_expr = meta.input.parse::<Expr>()?;
            self.read_type = ty;
            self.option = Some(if_expr);
        } else {
            return Err(meta.error("unsupported parse attribute"));
        }
        Ok(())
    }

    fn as_tokens(&self, endianess: &proc_macro2::TokenStream) -> proc_macro2::TokenStream {
        let read = match &self.e {
            FieldEnum::Normal => {
                let ty = &self.read_type;
                quote! {input.read_type::<#endianess, #ty>()?}
            }
            FieldEnum::LengthPrefixedString => {
                quote! {input.read_str()?.into()}
            }
            FieldEnum::SizedBuf(size) => {
                quote! {input.read_bytes(#size as usize)?.into()}
            }
            FieldEnum::Collection {
                field_ty,
                num_elems,
            } => {
                let item_ty = &self.read_type;
                quote! {
                    {
                        let tmp: ::parsing::Result<#field_ty> = (0..#num_elems)
                            .map(|_| input.read_type::<#endianess, #item_ty>())
                            .collect();
                        tmp?
                    }
                }
            }
        };
        let name = &self.name;
        if let Some(e) = &self.option {
            quote! {
                let #name = if #e {
                    Some(#read)
                } else {
                    None
                };
            }
        } else {
            quote! {
                let #name = #read;
            }
        }
    }
}

enum FieldOrDirective {
    Field(FieldStruct),
    Directive(ParsingDirective),
}

impl FieldOrDirective {
    fn as_tokens(&self, endianess: &proc_macro2::TokenStream) -> proc_macro2::TokenStream {
        match self {
            FieldOrDirective::Directive(thing) => thing.as_tokens(endianess),
            FieldOrDirective::Field(field) => field.as_tokens(endianess),
        }
    }
}

struct ParsedStruct {
    s: syn::ItemStruct,
    things: Vec<FieldOrDirective>,
}

impl Parse for ParsedStruct {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let struct_attrs = input.call(Attribute::parse_outer)?;
        let vis = input.parse::<Visibility>()?;
        let struct_token = input.parse::<Token![struct]>()?;
        let name = input.parse::<Ident>()?;
        let mut generics = input.parse::<Generics>()?;
        if input.peek(Token![where]) {
            generics.where_clause = Some(input.parse::<syn::WhereClause>()?)
        };

        let braced_input;
        let brace_token = braced!(braced_input in input);
        let input = braced_input;

        let mut fields = syn::punctuated::Punctuated::<Field, Comma>::new();
        let mut parsing_things = Vec::new();

        while !input.is_empty() {
            let mut inner = None;
            let r = DoubleBracketedInput::parse_nested(&input, |br, input| {
                inner = Some(ParsingDirective::parse_from_double_brackets(&br, input));
            });
            if r.is_ok() {
                // the double brackets parsed but the directive inside did not, bubble up
                if let Some(directive) = inner {
                    parsing_things.push(FieldOrDirective::Directive(directive?));
                }
                continue;
            }

            let mut field = input.call(syn::Field::parse_named)?;
            let mut field_thing = FieldStruct::from_field(&field)?;
            let field_ty = field.ty.clone();
            let mut err = Ok(());
            field.attrs.retain(|attr| {
                if !attr.path().is_ident("parse") {
                    return true;
                }
                let res = attr.parse_nested_meta(|meta| field_thing.apply_meta(&field_ty, meta));
                if res.is_err() {
                    err = res;
                }
                false
            });
            err?;
            parsing_things.push(FieldOrDirective::Field(field_thing));
            fields.push(field);
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        let fields = syn::FieldsNamed {
            brace_token,
            named: fields,
        };

        let s = syn::ItemStruct {
            attrs: struct_attrs,
            vis,
            struct_token,
            ident: name,
            generics,
            fields: syn::Fields::Named(fields),
            semi_token: None,
        };

        Ok(Self {
            s,
            things: parsing_things,
        })
    }
}

fn add_extra_lifetime_and_bound_generics(
    generics: &syn::Generics,
    lifetime: &syn::Lifetime,
    f: impl FnOnce(syn::ImplGenerics, syn::TypeGenerics, Option<&syn::WhereClause>),
) {
    let mut generics_mod = generics.clone();

    generics_mod.params.insert(
        0,
        syn::GenericParam::Lifetime(syn::LifetimeParam::new(lifetime.clone())),
    );

    let mut bounds = syn::punctuated::Punctuated::new();
    for l in generics.lifetimes() {
        bounds.push(l.lifetime.clone());
    }

    if !bounds.is_empty() {
        generics_mod
            .make_where_clause()
            .predicates
            .push(syn::WherePredicate::Lifetime(syn::PredicateLifetime {
                lifetime: lifetime.clone(),
                colon_token: syn::token::Colon::default(),
                bounds,
            }));
    }

    let (impl_generics, _ty_generics, where_clause) = generics_mod.split_for_impl();
    let (_impl_generics, ty_generics, _where_clause) = generics.split_for_impl();
    f(impl_generics, ty_generics, where_clause);
}

fn generate_parse_impl(
    things: &[FieldOrDirective],
    struct_def: &syn::ItemStruct,
) -> proc_macro2::TokenStream {
    let le = quote! {::parsing::LE};
    let be = quote! {::parsing::BE};
    let (parsing_le, parsing_be): (Vec<_>, Vec<_>) = things
        .iter()
        .map(|t| (t.as_tokens(&le), t.as_tokens(&be)))
        .unzip();

    let struct_name = &struct_def.ident;
    let field_names: Vec<_> = struct_def
        .fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .collect();

    let parse_lifetime = syn::Lifetime::new("'parse", Span::call_site());

    let mut out = proc_macro2::TokenStream::new();

    add_extra_lifetime_and_bound_generics(
        &struct_def.generics,
        &parse_lifetime,
        |impl_generics, ty_generics, where_clause| {
            out = quote! {
                impl #impl_generics ::parsing::Parse<#parse_lifetime, #le> for #struct_name #ty_generics #where_clause {
                    fn parse(input: &mut impl ::parsing::ReadBytes<#parse_lifetime>) -> ::parsing::Result<Self> {
                        #(
                            #parsing_le
                        )*
                        Ok(Self {
                            #(
                                #field_names
                            ),*
                        })
                    }
                }

                impl #impl_generics ::parsing::Parse<#parse_lifetime, #be> for #struct_name #ty_generics #where_clause {
                    fn parse(input: &mut impl ::parsing::ReadBytes<#parse_lifetime>) -> ::parsing::Result<Self> {
                        #(
                            #parsing_be
                        )*
                        Ok(Self {
                            #(
                                #field_names
                            ),*
                        })
                    }
                }
            };
        },
    );
    out
}

/// Derives the Parse trait for a struct
/// allows adding padding and hidden parameters
/// ```ignore
/// parsable_struct! {
///     pub struct Header {
///         pub field1: u16,
///         [[padding_bytes = 4]]
///         pub field2: u8,
///         [[ignore: u32]]
///         [[param: u32 = size_of_something]]
///         [[padding_bytes = 40]]
///     }
/// }
/// ```
/// `padding_bytes` will be taken out from the buffer during the parse,
/// but are not part of the struct definition.
/// `ignore` does the same for a value of the given type.
/// `[[param: <int type> = <name>]]` will parse an int from the buffer,
/// making it available to future fields, but will not add it to the struct definition
/// mostly intended to be used to hide sizes of buffers and counts from the struct definition
///
/// Sized buffers
/// ```ignore
/// parsable_struct! {
///     pub struct Blob {
///         [[param: u32 = len]]
///         #[parse(sized_buf = len)]
///         pub bytes: Vec<u8>,
///     }
/// }
/// ```
/// `.into()` is called on the byte slice, so anything that implements `From<&[u8]>`
/// can be used with `#[parse(sized_buf = <size_param>)]`
///
/// Strings prefixed by a little-endian `u16` length
/// ```ignore
/// parsable_struct! {
///     pub struct Named {
///         #[parse(string)]
///         pub name: String,
///     }
/// }
/// ```
///
/// Collections
/// ```ignore
/// parsing::parsable_struct! {
///     pub struct Header {
///         [[param: u8 = num_items]]
///         something: u32,
///         #[parse(collection: Item = num_items)]
///         items: Vec<Item>,
///     }
/// }
/// ```
/// Parse a number of variably-sized elements into a collection
/// Does not have to be a Vec, .collect() is called on an iterator.
///
/// Optional fields
/// ```ignore
/// parsing::parsable_struct! {
///     pub struct Layer {
///         pub kind: u16,
///         #[parse(option_if: u32 = kind == 2)]
///         pub tileset: Option<u32>,
///     }
/// }
/// ```
/// The field is read only when the expression, which may use any earlier
/// field or param, holds. Combines with `string`, `sized_buf` and `collection`.
#[proc_macro]
pub fn parsable_struct(input: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(input as ParsedStruct);
    let parse_impl = generate_parse_impl(&parsed.things, &parsed.s);
    let struct_def = &parsed.s;
    let expanded = quote! {
        #struct_def
        #parse_impl
    };
    TokenStream::from(expanded)
}

/// A simpler version of parsable_struct! that can be derived
#[proc_macro_derive(Parse)]
pub fn parse_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::ItemStruct);
    let things: syn::Result<Vec<_>> = input
        .fields
        .iter()
        .map(|field| FieldStruct::from_field(field).map(FieldOrDirective::Field))
        .collect();
    match things {
        Ok(things) => TokenStream::from(generate_parse_impl(&things, &input)),
        Err(err) => err.to_compile_error().into(),
    }
}
