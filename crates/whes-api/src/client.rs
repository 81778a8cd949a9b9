// Signed async client for the WHES battery cloud.
//
// Base path: /pangu/v1/
// Auth: per-request HMAC-SHA1 signed headers (see sign.rs)

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::canonical::ParamValue;
use crate::sign::{self, ApiCredentials};
use crate::transport::TransportConfig;
use crate::wire::{MetricsRequest, MetricsResponse};

/// Column requested by the credential probe.
const PROBE_COLUMN: &str = "ems_soc";
/// Probe window length in milliseconds.
const PROBE_WINDOW_MS: i64 = 30_000;

/// Identifiers of one monitored installation.
#[derive(Debug, Clone)]
pub struct Installation {
    pub project_id: String,
    pub device_id: String,
    pub ammeter_id: String,
}

/// Credential-probe outcome, collapsed for end-user reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialCheck {
    /// The cloud accepted a signed request.
    Valid,
    /// HTTP 401/403: key or secret rejected.
    InvalidCredentials,
    /// Anything else: unreachable host, timeout, undecodable response.
    CannotConnect { reason: String },
}

/// Async client for the WHES metrics API.
///
/// Holds the shared connection pool, the signing credentials, and the
/// installation identifiers; all fields are read-only after construction.
#[derive(Debug)]
pub struct WhesClient {
    http: reqwest::Client,
    base_url: String,
    credentials: ApiCredentials,
    installation: Installation,
}

impl WhesClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client with its own connection pool.
    pub fn new(
        base_url: &str,
        credentials: ApiCredentials,
        installation: Installation,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(http, base_url, credentials, installation)
    }

    /// Wrap an existing `reqwest::Client` (caller owns the pool).
    pub fn from_reqwest(
        http: reqwest::Client,
        base_url: &str,
        credentials: ApiCredentials,
        installation: Installation,
    ) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            credentials,
            installation,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an absolute endpoint path onto the trimmed base URL.
    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Url::parse(&format!("{}{path}", self.base_url)).map_err(Error::from)
    }

    fn ems_metrics_url(&self) -> Result<Url, Error> {
        self.endpoint(&format!(
            "/pangu/v1/projects/{}/devices/{}/ems/metrics",
            self.installation.project_id, self.installation.device_id
        ))
    }

    fn ammeter_metrics_url(&self) -> Result<Url, Error> {
        self.endpoint(&format!(
            "/pangu/v1/projects/{}/ammeters/{}/metrics",
            self.installation.project_id, self.installation.ammeter_id
        ))
    }

    // ── Signed POST ──────────────────────────────────────────────────

    async fn post_signed<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
        params: &[(&str, ParamValue)],
    ) -> Result<T, Error> {
        let headers = sign::signed_headers("POST", &url, params, &self.credentials);
        debug!("POST {url}");

        let mut request = self.http.post(url).json(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if !params.is_empty() {
            request = request.query(&expand_params(params));
        }

        let resp = request.send().await?;
        handle_response(resp).await
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Fetch EMS-series metrics for a time window.
    pub async fn ems_metrics(&self, request: &MetricsRequest) -> Result<MetricsResponse, Error> {
        let url = self.ems_metrics_url()?;
        self.post_signed(url, request, &[]).await
    }

    /// Fetch ammeter-series metrics for a time window.
    pub async fn ammeter_metrics(
        &self,
        request: &MetricsRequest,
    ) -> Result<MetricsResponse, Error> {
        let url = self.ammeter_metrics_url()?;
        self.post_signed(url, request, &[]).await
    }

    // ── Credential probe ─────────────────────────────────────────────

    /// Issue a minimal signed request (one column, 30 s window) against
    /// the EMS endpoint to confirm the credentials are accepted.
    pub async fn validate_credentials(&self, sample_by: &str) -> CredentialCheck {
        let end = chrono::Utc::now().timestamp_millis();
        let request = MetricsRequest {
            start: end - PROBE_WINDOW_MS,
            end,
            sample_by: sample_by.to_owned(),
            columns: vec![PROBE_COLUMN.to_owned()],
        };

        match self.ems_metrics(&request).await {
            Ok(_) => CredentialCheck::Valid,
            Err(e) if e.is_auth_rejection() => CredentialCheck::InvalidCredentials,
            Err(e) => CredentialCheck::CannotConnect {
                reason: e.to_string(),
            },
        }
    }
}

/// Classify the status, then decode the body as JSON regardless of the
/// declared content type.
async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            status: status.as_u16(),
            message: body,
        });
    }
    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Decode {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Validate the base URL and trim trailing slashes so absolute endpoint
/// paths concatenate predictably under a path-bearing base.
fn normalize_base_url(raw: &str) -> Result<String, Error> {
    Url::parse(raw)?;
    Ok(raw.trim_end_matches('/').to_owned())
}

fn expand_params(params: &[(&str, ParamValue)]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            ParamValue::Single(v) => pairs.push(((*key).to_owned(), v.clone())),
            ParamValue::List(items) => {
                for item in items {
                    pairs.push(((*key).to_owned(), item.clone()));
                }
            }
        }
    }
    pairs
}
