// Telephony provider request signatures
//
// The provider signs each webhook with HMAC-SHA1 over the full request URL
// followed by every POST parameter as key+value, sorted by key, keyed with
// the account auth token. The base64 digest arrives in X-Twilio-Signature.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::BTreeMap;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

fn signed_mac(auth_token: &str, url: &str, params: &BTreeMap<String, String>) -> HmacSha1 {
    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(url.as_bytes());
    for (key, value) in params {
        mac.update(key.as_bytes());
        mac.update(value.as_bytes());
    }
    mac
}

/// Signature the provider would send for this request
pub fn compute_signature(auth_token: &str, url: &str, params: &BTreeMap<String, String>) -> String {
    STANDARD.encode(signed_mac(auth_token, url, params).finalize().into_bytes())
}

/// Constant-time check of a received signature
pub fn verify_signature(
    auth_token: &str,
    url: &str,
    params: &BTreeMap<String, String>,
    signature: &str,
) -> bool {
    let Ok(received) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    signed_mac(auth_token, url, params)
        .verify_slice(&received)
        .is_ok()
}
