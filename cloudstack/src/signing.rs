//! Request signing.
//!
//! The signature is an HMAC-SHA1 over the canonical query string:
//! the encoded parameter set (sorted keys, escaped values) lower-cased, with
//! every `+` replaced by `%20`. The base64 digest travels as the `signature`
//! parameter of the otherwise unchanged, correctly-cased request.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::CloudStackError;
use crate::query::{Query, query_escape};

type HmacSha1 = Hmac<Sha1>;

/// Returns the string the signature is computed over.
pub fn canonical_string(query: &Query) -> String {
    query.encode().to_lowercase().replace('+', "%20")
}

/// Signs `query` with `secret`, returning the base64 digest.
///
/// ## Errors
///
/// Returns [`CloudStackError::Config`] if the secret cannot key the MAC.
///
/// ## Examples
///
/// ```
/// use cloudstack_runtime::{Query, signing::sign};
///
/// let query: Query = [("command", "listZones"), ("response", "json")].into_iter().collect();
/// let sig = sign(&query, "secret").unwrap();
/// assert_eq!(sig.len(), 28);
/// ```
pub fn sign(query: &Query, secret: &str) -> Result<String, CloudStackError> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| CloudStackError::Config(format!("invalid secret: {e}")))?;
    mac.update(canonical_string(query).as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Builds the full signed GET URL for `query`.
///
/// ## Errors
///
/// Returns [`CloudStackError::Config`] if the secret cannot key the MAC.
pub fn signed_url(base_url: &str, query: &Query, secret: &str) -> Result<String, CloudStackError> {
    let signature = sign(query, secret)?;
    Ok(format!(
        "{base_url}?{}&signature={}",
        query.encode(),
        query_escape(&signature)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const API_KEY: &str =
        "plgWJfZK4gyS3mOMTVmjUVg-X-jlWlnfaUJ9GAbBbf9EdM-kAYMmAiLqzzq1ElZLYq_u38zCm0bewzGUdP66mg";
    const SECRET: &str =
        "VDaACYb0LV9eNjTetIOElcVQkvJck_J_QljX_FcHRj87ZKiy0z0ty0ZsYBkoXkY9b7eq1EhwJaw7FF3akA3KBQ";

    fn list_users() -> Query {
        [("apiKey", API_KEY), ("command", "listUsers"), ("response", "json")]
            .into_iter()
            .collect()
    }

    #[test]
    fn canonical_string_is_lowercased() {
        let canonical = canonical_string(&list_users());
        assert!(canonical.starts_with("apikey=plgwjfzk4gys3momtvmjuvg"));
        assert!(canonical.ends_with("&command=listusers&response=json"));
    }

    #[test]
    fn known_answer_signature() {
        assert_eq!(sign(&list_users(), SECRET).unwrap(), "TTpdDq/7j/J58XCRHomKoQXEQds=");
    }

    #[test]
    fn spaces_are_signed_as_percent_twenty() {
        let mut query = list_users();
        query.set("name", "my vm");
        assert!(canonical_string(&query).contains("name=my%20vm"));
        assert_eq!(sign(&query, "secret").unwrap(), "1VytADzwUHl3UazihRGE87tzxgE=");
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a: Query = [("b", "2"), ("a", "1")].into_iter().collect();
        let b: Query = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(sign(&a, "k").unwrap(), sign(&b, "k").unwrap());
    }

    #[test]
    fn changing_a_value_changes_the_signature() {
        let a: Query = [("a", "1")].into_iter().collect();
        let b: Query = [("a", "2")].into_iter().collect();
        assert_ne!(sign(&a, "k").unwrap(), sign(&b, "k").unwrap());
    }

    #[test]
    fn signed_url_escapes_signature() {
        let mut query = list_users();
        query.set("name", "my vm");
        let url = signed_url("https://cloud.example/client/api", &query, "secret").unwrap();
        assert!(url.starts_with("https://cloud.example/client/api?apiKey="));
        assert!(url.contains("&name=my+vm&"));
        assert!(url.ends_with("&signature=1VytADzwUHl3UazihRGE87tzxgE%3D"));
    }
}
