//! Operation method generation.
//!
//! Each catalog operation becomes an `async fn` on its service facade. The
//! body is assembled from the operation's policy: which transport call to
//! use, which payload rewrites to apply, and whether to wait for an async job.

use cloudstack_define::{Operation, Policy, PolicyFlag};
use proc_macro2::{Ident, TokenStream};
use quote::quote;

use super::responses::{ResponseShape, is_success_only_response};
use crate::naming::{ident, method_name, params_type_name, type_ident};

/// Generates the facade method for one operation.
///
/// ## Examples
///
/// For an async operation in async mode:
/// ```ignore
/// pub async fn deploy_virtual_machine(
///     &self,
///     p: &DeployVirtualMachineParams,
/// ) -> Result<DeployVirtualMachineResponse, cloudstack_runtime::CloudStackError> {
///     let resp = self.transport.request("deployVirtualMachine", &p.to_query()).await?;
///     let r: DeployVirtualMachineResponse = serde::Deserialize::deserialize(&resp)?;
///     if !self.transport.is_async() {
///         return Ok(r);
///     }
///     let result = self.transport.wait_for_job(&r.jobid).await.map_err(|e| e.with_submission(resp))?;
///     ...
/// }
/// ```
pub fn generate_operation(op: &Operation, policy: &Policy, shape: &ResponseShape) -> TokenStream {
    let method = ident(&method_name(&op.name));
    let params = type_ident(&params_type_name(&op.name));
    let response = type_ident(&shape.name);
    let command = op.name.as_str();
    let doc = operation_doc(op);

    let call = if policy.has(PolicyFlag::RetryIdempotent) {
        quote! { request_idempotent }
    } else {
        quote! { request }
    };

    let unwrap = policy.has(PolicyFlag::UnwrapNestedEnvelope).then(|| {
        quote! { let resp = cloudstack_runtime::envelope::unwrap_value(resp)?; }
    });

    let body = if op.is_async {
        async_body(op, policy, &response)
    } else {
        let coerce = policy.has(PolicyFlag::CoercePorts).then(|| {
            quote! {
                let mut resp = resp;
                cloudstack_runtime::compat::coerce_firewall_ports(&mut resp)?;
            }
        });
        quote! {
            #coerce
            let r: #response = serde_json::from_value(resp)?;
            Ok(r)
        }
    };

    quote! {
        #(#[doc = #doc])*
        pub async fn #method(&self, p: &#params) -> Result<#response, cloudstack_runtime::CloudStackError> {
            let resp = self.transport.#call(#command, &p.to_query()).await?;
            #unwrap
            #body
        }
    }
}

/// The part of an async operation after the submission response arrived.
///
/// The submission is decoded first so the job id is known. In async mode
/// the job result replaces it, keeping the job id when the result has none.
fn async_body(op: &Operation, policy: &Policy, response: &Ident) -> TokenStream {
    let unwrap_result = (!is_success_only_response(op)).then(|| {
        quote! { let result = cloudstack_runtime::envelope::unwrap_value(result)?; }
    });
    let coerce = policy.has(PolicyFlag::CoercePorts).then(|| {
        quote! {
            let mut result = result;
            cloudstack_runtime::compat::coerce_firewall_ports(&mut result)?;
        }
    });
    let collapse = policy.collapse_rule_field().map(|field| {
        quote! { let result = cloudstack_runtime::compat::collapse_single_rule(result, #field); }
    });

    quote! {
        let r: #response = serde::Deserialize::deserialize(&resp)?;
        if !self.transport.is_async() {
            return Ok(r);
        }
        let result = self
            .transport
            .wait_for_job(&r.jobid)
            .await
            .map_err(|e| e.with_submission(resp))?;
        #unwrap_result
        #coerce
        #collapse
        let mut decoded: #response = serde_json::from_value(result)?;
        if decoded.jobid.is_empty() {
            decoded.jobid = r.jobid;
        }
        Ok(decoded)
    }
}

fn operation_doc(op: &Operation) -> Vec<String> {
    let mut lines = Vec::new();
    let description = op.description.trim();
    if description.is_empty() {
        lines.push(format!(" Calls `{}`.", op.name));
    } else {
        lines.extend(description.lines().map(|line| format!(" {}", line.trim())));
    }
    if op.is_async {
        lines.push(String::new());
        lines.push(
            " Asynchronous: when the client is in async mode the call waits for the job and returns its result."
                .to_string(),
        );
    }
    lines
}
