//! Client and facade generation.
//!
//! The shared artifact holds `CloudStackClient` and one facade struct per
//! service. Every facade keeps a handle on the same `Transport`; the methods
//! are added to the facades by the service modules.

use proc_macro2::TokenStream;
use quote::quote;

use crate::grouper::Service;
use crate::naming::{ident, type_ident};

/// Generates `client.rs`.
///
/// ## Examples
///
/// ```ignore
/// let client = CloudStackClient::new("https://cloud.example/client/api", "key", "secret", true)?;
/// let zones = client.zone.list_zones(&ListZonesParams::new()).await?;
/// ```
pub fn generate_client(services: &[&Service]) -> TokenStream {
    let facade_fields: Vec<_> = services
        .iter()
        .map(|s| (ident(&s.facade_field()), type_ident(&s.name)))
        .collect();

    let field_defs = facade_fields.iter().map(|(field, ty)| {
        quote! { pub #field: #ty }
    });
    let field_inits = facade_fields.iter().map(|(field, ty)| {
        quote! { #field: #ty::new(Arc::clone(&transport)) }
    });
    let facades = services.iter().map(|s| generate_facade(s));

    quote! {
        //! The API client and its service facades.

        use std::sync::Arc;

        use cloudstack_runtime::{ClientConfig, CloudStackError, Transport};

        /// Client for the platform API.
        ///
        /// Operations are grouped by service, one public field per service.
        #[derive(Debug, Clone)]
        pub struct CloudStackClient {
            transport: Arc<Transport>,
            #(#field_defs,)*
        }

        impl CloudStackClient {
            /// Creates a client that returns async job submissions without waiting for them.
            ///
            /// ## Errors
            ///
            /// Returns an error if the URL is invalid, a credential is empty, or
            /// the HTTP client cannot be built.
            pub fn new(api_url: &str, api_key: &str, secret: &str, verify_ssl: bool) -> Result<Self, CloudStackError> {
                let config = ClientConfig::builder(api_url, api_key, secret)
                    .verify_ssl(verify_ssl)
                    .build()?;
                Self::from_config(config)
            }

            /// Creates a client whose async operations wait for their job to finish.
            ///
            /// ## Errors
            ///
            /// Same as [`CloudStackClient::new`].
            pub fn new_async(api_url: &str, api_key: &str, secret: &str, verify_ssl: bool) -> Result<Self, CloudStackError> {
                let config = ClientConfig::builder(api_url, api_key, secret)
                    .verify_ssl(verify_ssl)
                    .async_mode(true)
                    .build()?;
                Self::from_config(config)
            }

            /// Creates a client from a full configuration.
            ///
            /// ## Errors
            ///
            /// Returns an error if the HTTP client cannot be built.
            pub fn from_config(config: ClientConfig) -> Result<Self, CloudStackError> {
                let transport = Arc::new(Transport::new(config)?);
                Ok(Self {
                    #(#field_inits,)*
                    transport,
                })
            }

            /// The transport shared by all services.
            pub fn transport(&self) -> &Transport {
                &self.transport
            }

            /// Waits for an async job and returns its raw result.
            ///
            /// ## Errors
            ///
            /// Returns the job's failure, or `AsyncTimeout` when the configured
            /// timeout passes first.
            pub async fn get_async_job_result(&self, job_id: &str) -> Result<serde_json::Value, CloudStackError> {
                self.transport.wait_for_job(job_id).await
            }
        }

        #(#facades)*
    }
}

fn generate_facade(service: &Service) -> TokenStream {
    let name = type_ident(&service.name);
    let doc = format!(" Operations of `{}`.", service.name);

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone)]
        pub struct #name {
            pub(crate) transport: Arc<Transport>,
        }

        impl #name {
            pub fn new(transport: Arc<Transport>) -> Self {
                Self { transport }
            }
        }
    }
}
