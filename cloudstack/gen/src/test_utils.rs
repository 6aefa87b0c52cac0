//! Shared test utilities for cloudstack-gen tests.
//!
//! Builders for catalog fixtures plus a renderer that turns generated
//! tokens into formatted source, so assertions read like the output files.

use cloudstack_define::{Operation, Param, PrimitiveType, ResponseField};
use proc_macro2::TokenStream;

use crate::output::{format_code, validate_code};

/// Creates a synchronous operation with the given params and no response fields.
pub fn operation(name: &str, params: &[Param]) -> Operation {
    Operation {
        name: name.to_string(),
        params: params.to_vec(),
        ..Operation::default()
    }
}

/// Creates a param from a catalog type tag.
pub fn param(name: &str, kind: &str, required: bool) -> Param {
    Param {
        name: name.to_string(),
        kind: PrimitiveType::from(kind.to_string()),
        required,
        ..Param::default()
    }
}

/// Creates a scalar response field from a catalog type tag.
pub fn response(name: &str, kind: &str) -> ResponseField {
    ResponseField {
        name: name.to_string(),
        kind: PrimitiveType::from(kind.to_string()),
        ..ResponseField::default()
    }
}

/// Creates a nested response field.
pub fn nested(name: &str, children: Vec<ResponseField>) -> ResponseField {
    ResponseField {
        name: name.to_string(),
        kind: PrimitiveType::List,
        response: children,
        ..ResponseField::default()
    }
}

/// Validates and formats generated tokens, panicking with the tokens on failure.
pub fn render(tokens: &TokenStream) -> String {
    match validate_code(tokens) {
        Ok(file) => format_code(&file),
        Err(e) => panic!("{e}\n\n{tokens}"),
    }
}
