//! The free-form `CustomService` module.

use proc_macro2::TokenStream;
use quote::quote;

/// Generates the module body of `CustomService`.
///
/// It has no catalog operations, only `custom_request`, which sends any
/// command with a `cloudstack_runtime::CustomParams` bag and decodes the unwrapped response into a caller-chosen type.
pub fn generate_custom_module() -> TokenStream {
    quote! {
        //! Free-form requests for operations without a typed wrapper.

        use crate::*;

        impl CustomService {
            /// Sends `api` with the given parameters and decodes the response into `T`.
            ///
            /// ## Examples
            ///
            /// ```ignore
            /// let mut p = CustomParams::new();
            /// p.set_param("name", "Zone1");
            /// let zones: serde_json::Value = client.custom.custom_request("listZones", &p).await?;
            /// ```
            ///
            /// ## Errors
            ///
            /// Returns the transport or API error, or `Json` when the response
            /// does not fit `T`.
            pub async fn custom_request<T: serde::de::DeserializeOwned>(
                &self,
                api: &str,
                p: &cloudstack_runtime::CustomParams,
            ) -> Result<T, CloudStackError> {
                let resp = self.transport.request(api, &p.to_query()).await?;
                Ok(serde_json::from_value(resp)?)
            }
        }
    }
}
