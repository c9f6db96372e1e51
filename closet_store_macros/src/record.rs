use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type};

/// What a struct field is to the generated `Record` impl.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Id,
    CreatedAt,
    UpdatedAt,
    Flag,
    Skip,
    Plain,
}

struct FieldInfo {
    ident: Ident,
    ty: Type,
    wire_name: String,
    role: Role,
}

impl FieldInfo {
    fn patchable(&self) -> bool {
        !matches!(self.role, Role::Id | Role::CreatedAt | Role::UpdatedAt)
    }

    fn reflected(&self) -> bool {
        !matches!(self.role, Role::CreatedAt | Role::UpdatedAt | Role::Skip)
    }

    /// Names this field answers to: its wire name, plus the Rust name when it differs.
    fn names(&self) -> Vec<LitStr> {
        let rust_name = self.ident.to_string();
        let mut names = vec![LitStr::new(&self.wire_name, self.ident.span())];
        if rust_name != self.wire_name {
            names.push(LitStr::new(&rust_name, self.ident.span()));
        }
        names
    }
}

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;
    let patch_name = format_ident!("{}Patch", name);

    // Extract #[record(collection = "...")] from struct-level attributes
    let collection = extract_collection(input)?;
    let rename_all = extract_rename_all(input);
    let fields = collect_fields(input, rename_all.as_deref())?;

    let id_field = fields
        .iter()
        .find(|f| f.role == Role::Id)
        .map(|f| f.ident.clone())
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "Record derive: no field marked with #[record(id)] and no field named `id`",
            )
        })?;
    let created_field = fields.iter().find(|f| f.role == Role::CreatedAt);
    let updated_field = fields.iter().find(|f| f.role == Role::UpdatedAt);

    let patch_fields: Vec<&FieldInfo> = fields.iter().filter(|f| f.patchable()).collect();
    let patch_idents: Vec<&Ident> = patch_fields.iter().map(|f| &f.ident).collect();
    let patch_types: Vec<&Type> = patch_fields.iter().map(|f| &f.ty).collect();

    let patch_doc = format!(
        "Partial update for [`{}`]. `None` fields are left unchanged.",
        name
    );

    let timestamp_fns = match (created_field, updated_field) {
        (Some(created), Some(updated)) => {
            let created = &created.ident;
            let updated = &updated.ident;
            quote! {
                fn created_at(&self) -> ::core::option::Option<::closet_store::Timestamp> {
                    ::core::option::Option::Some(self.#created)
                }

                fn stamp_created(&mut self, now: ::closet_store::Timestamp) {
                    self.#created = now;
                    self.#updated = now;
                }

                fn stamp_updated(&mut self, now: ::closet_store::Timestamp) {
                    self.#updated = now;
                }
            }
        }
        (Some(created), None) => {
            let created = &created.ident;
            quote! {
                fn created_at(&self) -> ::core::option::Option<::closet_store::Timestamp> {
                    ::core::option::Option::Some(self.#created)
                }

                fn stamp_created(&mut self, now: ::closet_store::Timestamp) {
                    self.#created = now;
                }
            }
        }
        (None, Some(updated)) => {
            let updated = &updated.ident;
            quote! {
                fn stamp_created(&mut self, now: ::closet_store::Timestamp) {
                    self.#updated = now;
                }

                fn stamp_updated(&mut self, now: ::closet_store::Timestamp) {
                    self.#updated = now;
                }
            }
        }
        (None, None) => quote! {},
    };

    let flags: Vec<&FieldInfo> = fields.iter().filter(|f| f.role == Role::Flag).collect();
    let flag_fns = if flags.is_empty() {
        quote! {}
    } else {
        let arms_get = flags.iter().map(|f| {
            let ident = &f.ident;
            let names = f.names();
            quote! { #(#names)|* => ::core::option::Option::Some(self.#ident), }
        });
        let arms_set = flags.iter().map(|f| {
            let ident = &f.ident;
            let names = f.names();
            quote! {
                #(#names)|* => {
                    self.#ident = value;
                    true
                }
            }
        });
        quote! {
            fn flag(&self, field: &str) -> ::core::option::Option<bool> {
                match field {
                    #(#arms_get)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_flag(&mut self, field: &str, value: bool) -> bool {
                match field {
                    #(#arms_set)*
                    _ => false,
                }
            }
        }
    };

    let field_arms = fields.iter().filter(|f| f.reflected()).map(|f| {
        let ident = &f.ident;
        let names = f.names();
        quote! {
            #(#names)|* => ::core::option::Option::Some(::closet_store::AsField::as_field(&self.#ident)),
        }
    });

    Ok(quote! {
        #[doc = #patch_doc]
        #[derive(Debug, Clone, Default)]
        #vis struct #patch_name {
            #( pub #patch_idents: ::core::option::Option<#patch_types>, )*
        }

        impl #patch_name {
            #(
                pub fn #patch_idents(mut self, value: impl ::core::convert::Into<#patch_types>) -> Self {
                    self.#patch_idents = ::core::option::Option::Some(value.into());
                    self
                }
            )*
        }

        impl ::closet_store::Record for #name {
            const COLLECTION: &'static str = #collection;

            type Patch = #patch_name;

            fn id(&self) -> &str {
                &self.#id_field
            }

            fn set_id(&mut self, id: ::std::string::String) {
                self.#id_field = id;
            }

            fn apply(&mut self, patch: Self::Patch) {
                #(
                    if let ::core::option::Option::Some(value) = patch.#patch_idents {
                        self.#patch_idents = value;
                    }
                )*
            }

            #timestamp_fns

            #flag_fns

            fn field(&self, name: &str) -> ::core::option::Option<::closet_store::FieldValue<'_>> {
                match name {
                    #(#field_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

fn extract_collection(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        let mut collection = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported #[record] container attribute"))
            }
        })?;

        if let Some(c) = collection {
            return Ok(c);
        }
    }

    // Default: camelCase struct name + "s", matching the persisted key style
    let name = input.ident.to_string();
    Ok(format!("{}s", to_camel_case(&to_snake_case(&name))))
}

/// Reads `#[serde(rename_all = "...")]` so generated names match the wire format.
fn extract_rename_all(input: &DeriveInput) -> Option<String> {
    let mut rename_all = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let value: LitStr = meta.value()?.parse()?;
                rename_all = Some(value.value());
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    rename_all
}

fn serde_rename(field: &syn::Field) -> Option<String> {
    let mut rename = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                rename = Some(value.value());
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    rename
}

fn field_role(field: &syn::Field) -> syn::Result<Option<Role>> {
    let mut role = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            role = Some(if meta.path.is_ident("id") {
                Role::Id
            } else if meta.path.is_ident("created_at") {
                Role::CreatedAt
            } else if meta.path.is_ident("updated_at") {
                Role::UpdatedAt
            } else if meta.path.is_ident("flag") {
                Role::Flag
            } else if meta.path.is_ident("skip") {
                Role::Skip
            } else {
                return Err(meta.error("expected one of: id, created_at, updated_at, flag, skip"));
            });
            Ok(())
        })?;
    }
    Ok(role)
}

fn collect_fields(input: &DeriveInput, rename_all: Option<&str>) -> syn::Result<Vec<FieldInfo>> {
    let named = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record derive requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record derive only supports structs",
            ))
        }
    };

    let has_explicit_id = named.iter().any(|f| matches!(field_role(f), Ok(Some(Role::Id))));

    let mut fields = Vec::with_capacity(named.len());
    for field in named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let rust_name = ident.to_string();

        let role = match field_role(field)? {
            Some(role) => role,
            // Default: a field named "id" is the identifier
            None if !has_explicit_id && rust_name == "id" => Role::Id,
            None => Role::Plain,
        };

        let wire_name = match serde_rename(field) {
            Some(renamed) => renamed,
            None if rename_all == Some("camelCase") => to_camel_case(&rust_name),
            None => rust_name,
        };

        fields.push(FieldInfo {
            ident,
            ty: field.ty.clone(),
            wire_name,
            role,
        });
    }

    Ok(fields)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut upper_next = false;
    for ch in s.chars() {
        if ch == '_' {
            upper_next = !result.is_empty();
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
