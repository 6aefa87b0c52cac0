//! Mapping from catalog type tags to Rust types.

use cloudstack_define::PrimitiveType;
use proc_macro2::TokenStream;
use quote::quote;

/// Record emitted for `uservmresponse` references.
pub const VIRTUAL_MACHINE_RECORD: &str = "VirtualMachine";

/// Record emitted for `outofbandmanagementresponse` references.
pub const OUT_OF_BAND_RECORD: &str = "OutOfBandManagementResponse";

/// The Rust type a catalog field or param is generated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    Bool,
    I32,
    I64,
    F64,
    /// `Vec<String>`, sent comma-joined.
    StringList,
    /// `BTreeMap<String, String>`, sent with an indexed map encoding.
    StringMap,
    /// `Vec<serde_json::Value>`, an opaque set.
    ValueList,
    /// `serde_json::Value`, passed through untouched.
    RawValue,
    /// `Option<Box<VirtualMachine>>`.
    VirtualMachineRef,
    /// `OutOfBandManagementResponse`.
    OutOfBandManagement,
    String,
    /// A tag the generator does not know; generated as `String`.
    Unknown(String),
}

impl RustType {
    /// Maps a catalog type tag.
    pub fn from_primitive(kind: &PrimitiveType) -> Self {
        match kind {
            PrimitiveType::Boolean => RustType::Bool,
            PrimitiveType::Short | PrimitiveType::Int | PrimitiveType::Integer => RustType::I32,
            PrimitiveType::Long => RustType::I64,
            PrimitiveType::Float => RustType::F64,
            PrimitiveType::List => RustType::StringList,
            PrimitiveType::Map => RustType::StringMap,
            PrimitiveType::Set => RustType::ValueList,
            PrimitiveType::ResponseObject => RustType::RawValue,
            PrimitiveType::UserVmResponse => RustType::VirtualMachineRef,
            PrimitiveType::OutOfBandManagementResponse => RustType::OutOfBandManagement,
            PrimitiveType::String | PrimitiveType::Uuid | PrimitiveType::Date => RustType::String,
            PrimitiveType::Other(tag) => RustType::Unknown(tag.clone()),
        }
    }

    /// Maps a catalog type tag for use as a request parameter.
    ///
    /// Record references cannot be sent on the wire, so they fall back to
    /// their string form.
    pub fn for_param(kind: &PrimitiveType) -> Self {
        match Self::from_primitive(kind) {
            RustType::VirtualMachineRef | RustType::OutOfBandManagement => RustType::String,
            other => other,
        }
    }

    /// Returns `true` for types generated as `String`.
    pub fn is_string(&self) -> bool {
        matches!(self, RustType::String | RustType::Unknown(_))
    }

    /// Replaces record references whose record is not generated with a raw JSON value.
    pub fn resolve_records(self, has_record: impl Fn(&str) -> bool) -> Self {
        match self {
            RustType::VirtualMachineRef if !has_record(VIRTUAL_MACHINE_RECORD) => RustType::RawValue,
            RustType::OutOfBandManagement if !has_record(OUT_OF_BAND_RECORD) => RustType::RawValue,
            other => other,
        }
    }

    /// Returns the type as tokens.
    pub fn tokens(&self) -> TokenStream {
        match self {
            RustType::Bool => quote! { bool },
            RustType::I32 => quote! { i32 },
            RustType::I64 => quote! { i64 },
            RustType::F64 => quote! { f64 },
            RustType::StringList => quote! { Vec<String> },
            RustType::StringMap => quote! { std::collections::BTreeMap<String, String> },
            RustType::ValueList => quote! { Vec<serde_json::Value> },
            RustType::RawValue => quote! { serde_json::Value },
            RustType::VirtualMachineRef => quote! { Option<Box<VirtualMachine>> },
            RustType::OutOfBandManagement => quote! { OutOfBandManagementResponse },
            RustType::String | RustType::Unknown(_) => quote! { String },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_tags() {
        assert_eq!(RustType::from_primitive(&PrimitiveType::Short), RustType::I32);
        assert_eq!(RustType::from_primitive(&PrimitiveType::Integer), RustType::I32);
        assert_eq!(RustType::from_primitive(&PrimitiveType::Long), RustType::I64);
        assert_eq!(RustType::from_primitive(&PrimitiveType::Float), RustType::F64);
    }

    #[test]
    fn unknown_tags_are_strings() {
        let mapped = RustType::from_primitive(&PrimitiveType::from("imageformat".to_string()));
        assert_eq!(mapped, RustType::Unknown("imageformat".to_string()));
        assert!(mapped.is_string());
        assert_eq!(mapped.tokens().to_string(), "String");
    }

    #[test]
    fn uuid_and_date_are_strings() {
        assert!(RustType::from_primitive(&PrimitiveType::Uuid).is_string());
        assert!(RustType::from_primitive(&PrimitiveType::Date).is_string());
    }

    #[test]
    fn record_references_fall_back_when_missing() {
        let vm = RustType::from_primitive(&PrimitiveType::UserVmResponse);
        assert_eq!(vm.clone().resolve_records(|_| true), RustType::VirtualMachineRef);
        assert_eq!(vm.resolve_records(|_| false), RustType::RawValue);

        let oob = RustType::from_primitive(&PrimitiveType::OutOfBandManagementResponse);
        assert_eq!(
            oob.resolve_records(|name| name == OUT_OF_BAND_RECORD),
            RustType::OutOfBandManagement
        );
    }

    #[test]
    fn record_references_are_strings_as_params() {
        assert_eq!(RustType::for_param(&PrimitiveType::UserVmResponse), RustType::String);
        assert_eq!(RustType::for_param(&PrimitiveType::Map), RustType::StringMap);
    }

    #[test]
    fn map_tokens_are_ordered() {
        let tokens = RustType::StringMap.tokens().to_string();
        assert!(tokens.contains("BTreeMap"), "maps should be ordered: {tokens}");
    }
}
