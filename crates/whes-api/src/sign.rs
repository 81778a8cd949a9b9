// wts request signing.
//
// Every request carries four x-wts-* headers plus
// `Authorization: wts {api_key}:{base64(hmac_sha1(secret, input))}`.
// The signing input layout is a fixed wire contract; see string_to_sign.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use url::Url;

use crate::canonical::{ParamValue, canonical_path_and_query};

type HmacSha1 = Hmac<Sha1>;

pub const HEADER_DATE: &str = "x-wts-date";
pub const HEADER_SIGNATURE_METHOD: &str = "x-wts-signature-method";
pub const HEADER_NONCE: &str = "x-wts-signature-nonce";
pub const HEADER_VERSION: &str = "x-wts-signature-version";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const SIGNATURE_VERSION: &str = "1.0";

/// API key plus shared signing secret for one WHES account.
///
/// The secret lives in a [`SecretString`]: Debug output and logs show a
/// redaction marker, never the key material.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: SecretString,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
        }
    }
}

/// Build the signed header set for one request, in wire order:
/// the four `x-wts-*` headers followed by `Authorization`.
///
/// Samples the current time and a fresh 8-digit nonce, so two calls for
/// the same request produce different signatures.
pub fn signed_headers(
    method: &str,
    url: &Url,
    extra: &[(&str, ParamValue)],
    credentials: &ApiCredentials,
) -> Vec<(&'static str, String)> {
    let date_ms = Utc::now().timestamp_millis();
    let nonce: u32 = rand::thread_rng().gen_range(10_000_000..=99_999_999);
    signed_headers_at(method, url, extra, credentials, date_ms, nonce)
}

fn signed_headers_at(
    method: &str,
    url: &Url,
    extra: &[(&str, ParamValue)],
    credentials: &ApiCredentials,
    date_ms: i64,
    nonce: u32,
) -> Vec<(&'static str, String)> {
    let signed = [
        (HEADER_DATE, date_ms.to_string()),
        (HEADER_SIGNATURE_METHOD, SIGNATURE_METHOD.to_owned()),
        (HEADER_NONCE, nonce.to_string()),
        (HEADER_VERSION, SIGNATURE_VERSION.to_owned()),
    ];

    let canonical = canonical_path_and_query(url, extra);
    let input = string_to_sign(method, &signed, &canonical);
    let signature = hmac_base64(credentials.api_secret.expose_secret(), &input);

    let mut headers = Vec::from(signed);
    headers.push((
        HEADER_AUTHORIZATION,
        format!("wts {}:{signature}", credentials.api_key),
    ));
    headers
}

/// Signing input: uppercased method, then each signed header as a
/// `name: value` fragment run together with no separator and no trailing
/// break, then the canonical path+query. Byte-exact wire contract.
fn string_to_sign(method: &str, signed: &[(&'static str, String)], canonical: &str) -> String {
    let mut input = method.to_uppercase();
    for (name, value) in signed {
        input.push_str(name);
        input.push_str(": ");
        input.push_str(value);
    }
    input.push_str(canonical);
    input
}

fn hmac_base64(secret: &str, input: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(input.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}
