//! The client generated from `cloudstack/gen/tests/fixtures`, built as part
//! of the workspace so its behaviour can be tested against a mock endpoint.

include!(concat!(env!("OUT_DIR"), "/cloudstack_client.rs"));
