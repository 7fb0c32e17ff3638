//! Feed API client.
//!
//! Owns the base URL, the transport and the pro identity. REST calls live
//! here; the streaming calls are in `crate::stream`.

use chrono::{DateTime, Utc};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::adapters::ReqwestHttpClient;
use crate::auth::{non_blank, Identity, ACCEPT_EVENT_STREAM, ADMIN_KEY_HEADER};
use crate::config::FeedConfig;
use crate::error::{ApiError, FeedError, FeedResult};
use crate::models::{
    format_since, CreateProWalletResponse, FactsWindow, FeedCursor, MatchFilters,
    MatchesSnapshot, MatchesUpdate, MatchingDirection, PatchReviewStatusResponse,
    ReviewStatusRequest, SpeechAudioUpload, SpeechStatusResponse, SpeechTextUpload,
    SpeechUploadResponse, VerifyProWalletResponse, DEFAULT_AUDIO_FILE_NAME,
};
use crate::traits::{FormPart, Headers, HttpClient, HttpRequest};

/// Client for the facts and matches API.
///
/// Cheap to clone; clones share the transport.
///
/// # Example
///
/// ```ignore
/// use feedline::FeedClient;
///
/// let client = FeedClient::new("https://api.example.com")?.with_auth("pro-123", "token");
/// let window = client.get_facts_snapshot("pro-123", 50).await?;
/// println!("{} facts", window.items.len());
/// ```
#[derive(Clone)]
pub struct FeedClient {
    base_url: Url,
    http: Arc<dyn HttpClient>,
    identity: Identity,
}

impl FeedClient {
    /// Create a client using the default reqwest transport.
    pub fn new(base_url: &str) -> FeedResult<Self> {
        Self::with_http_client(base_url, Arc::new(ReqwestHttpClient::new()))
    }

    /// Create a client over any [`HttpClient`] implementation.
    ///
    /// The base URL must have a scheme and host. Its path is kept as a
    /// prefix; any query or fragment is dropped.
    pub fn with_http_client(base_url: &str, http: Arc<dyn HttpClient>) -> FeedResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            http,
            identity: Identity::anonymous(),
        })
    }

    /// Create a client from a [`FeedConfig`], with its connect timeout and identity.
    pub fn from_config(config: &FeedConfig) -> FeedResult<Self> {
        let inner = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FeedError::Config(format!("build http client: {}", e)))?;

        let http = Arc::new(ReqwestHttpClient::with_client(inner));
        let mut client = Self::with_http_client(&config.base_url, http)?;
        client.identity = config.identity();
        Ok(client)
    }

    /// Set the identity headers sent with every request.
    pub fn with_auth(mut self, pro_id: &str, pro_token: &str) -> Self {
        self.set_auth(pro_id, pro_token);
        self
    }

    /// Set the identity on an existing client.
    pub fn set_auth(&mut self, pro_id: &str, pro_token: &str) {
        self.identity = Identity::new(pro_id, pro_token);
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    /// Base URL plus `path`, keeping any base path prefix.
    pub(crate) fn endpoint_url(&self, path: &str, query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        let base = self.base_url.path().trim_end_matches('/');
        let relative = path.trim().trim_start_matches('/');
        url.set_path(&format!("{}/{}", base, relative));

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        url
    }

    pub(crate) fn build_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        extra: &Headers,
    ) -> HttpRequest {
        HttpRequest::new(method, self.endpoint_url(path, query))
            .with_headers(self.identity.merge_headers(extra))
    }

    pub(crate) fn stream_request(&self, path: &str, query: &[(&str, String)]) -> HttpRequest {
        let mut extra = Headers::new();
        extra.insert("Accept".to_string(), ACCEPT_EVENT_STREAM.to_string());
        self.build_request(Method::GET, path, query, &extra)
    }

    /// Send a buffered request and decode a 2xx JSON body.
    ///
    /// An empty 2xx body decodes as `{}`.
    async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> FeedResult<T> {
        debug!(operation, method = %request.method, url = %request.url, "Sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| FeedError::Connection { operation, source })?;

        if !response.is_success() {
            let source = ApiError::from_response(response.status, response.body);
            debug!(
                operation,
                status = source.status,
                message = %source.message,
                "Request rejected"
            );
            return Err(FeedError::Api { operation, source });
        }

        let body: &[u8] = if response.body.is_empty() {
            b"{}"
        } else {
            &response.body
        };
        serde_json::from_slice(body).map_err(|source| FeedError::Decode { operation, source })
    }

    // ---- Facts ----

    /// GET /api/facts/items/snapshot
    ///
    /// `limit` of 0 leaves the page size to the server.
    pub async fn get_facts_snapshot(&self, pro_id: &str, limit: u32) -> FeedResult<FactsWindow> {
        const OPERATION: &str = "get_facts_snapshot";
        let mut query = vec![("proId", require_pro_id(OPERATION, pro_id)?)];
        push_limit(&mut query, limit);

        let request = self.build_request(
            Method::GET,
            "/api/facts/items/snapshot",
            &query,
            &Headers::new(),
        );
        self.execute_json(OPERATION, request).await
    }

    /// GET /api/facts/items/updates
    ///
    /// Facts changed after `(since, since_id)`. Without `since` the server
    /// filters on the id alone.
    pub async fn get_facts_updates(
        &self,
        pro_id: &str,
        since: Option<DateTime<Utc>>,
        since_id: i64,
        limit: u32,
    ) -> FeedResult<FactsWindow> {
        const OPERATION: &str = "get_facts_updates";
        let pro_id = require_pro_id(OPERATION, pro_id)?;
        if since_id < 0 {
            return Err(FeedError::invalid_argument(OPERATION, "since_id must be >= 0"));
        }

        let mut query = vec![("proId", pro_id)];
        if let Some(since) = since {
            query.push(("sinceUpdatedUtc", format_since(&since)));
        }
        query.push(("sinceId", since_id.to_string()));
        push_limit(&mut query, limit);

        let request = self.build_request(
            Method::GET,
            "/api/facts/items/updates",
            &query,
            &Headers::new(),
        );
        self.execute_json(OPERATION, request).await
    }

    /// PATCH /api/facts/items/{id}/review-status
    pub async fn patch_fact_review_status(
        &self,
        pro_id: &str,
        id: i64,
        review_status: &str,
    ) -> FeedResult<PatchReviewStatusResponse> {
        const OPERATION: &str = "patch_fact_review_status";
        let pro_id = require_pro_id(OPERATION, pro_id)?;
        if id <= 0 {
            return Err(FeedError::invalid_argument(OPERATION, "id must be > 0"));
        }

        let body = serde_json::to_vec(&ReviewStatusRequest {
            review_status: review_status.trim().to_string(),
        })
        .map_err(|source| FeedError::Decode { operation: OPERATION, source })?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let request = self
            .build_request(
                Method::PATCH,
                &format!("/api/facts/items/{}/review-status", id),
                &[("proId", pro_id)],
                &headers,
            )
            .with_body(body);
        self.execute_json(OPERATION, request).await
    }

    // ---- Matches ----

    /// GET /api/matches/items/snapshot
    pub async fn get_matches_snapshot(
        &self,
        pro_id: &str,
        direction: MatchingDirection,
        filters: &MatchFilters,
    ) -> FeedResult<MatchesSnapshot> {
        const OPERATION: &str = "get_matches_snapshot";
        let mut query = vec![
            ("proId", require_pro_id(OPERATION, pro_id)?),
            ("direction", direction.as_str().to_string()),
        ];
        query.extend(filters.query_pairs());

        let request = self.build_request(
            Method::GET,
            "/api/matches/items/snapshot",
            &query,
            &Headers::new(),
        );
        self.execute_json(OPERATION, request).await
    }

    /// GET /api/matches/items/updates
    ///
    /// A zero cursor timestamp is left out of the query, so the server
    /// filters on the cursor id alone.
    pub async fn get_matches_updates(
        &self,
        pro_id: &str,
        direction: Option<MatchingDirection>,
        cursor: FeedCursor,
        filters: &MatchFilters,
    ) -> FeedResult<MatchesUpdate> {
        const OPERATION: &str = "get_matches_updates";
        let pro_id = require_pro_id(OPERATION, pro_id)?;
        if cursor.id < 0 {
            return Err(FeedError::invalid_argument(OPERATION, "cursor id must be >= 0"));
        }

        let mut query = vec![("proId", pro_id)];
        if let Some(direction) = direction {
            query.push(("direction", direction.as_str().to_string()));
        }
        if !cursor.is_zero() {
            query.push(("sinceUpdatedUtc", cursor.since_param()));
        }
        query.push(("sinceId", cursor.id.to_string()));
        query.extend(filters.query_pairs());

        let request = self.build_request(
            Method::GET,
            "/api/matches/items/updates",
            &query,
            &Headers::new(),
        );
        self.execute_json(OPERATION, request).await
    }

    // ---- Speech ----

    /// POST /api/speech/upload
    ///
    /// Sends one audio chunk as `multipart/form-data`. The audio goes in the
    /// `audio` part; ids, chunk index and a non-zero sample rate go as text
    /// fields.
    pub async fn upload_speech_audio(
        &self,
        upload: SpeechAudioUpload,
    ) -> FeedResult<SpeechUploadResponse> {
        const OPERATION: &str = "upload_speech_audio";
        let pro_id = require_pro_id(OPERATION, &upload.pro_id)?;
        let session_id = require_session_id(OPERATION, &upload.session_id)?;
        if upload.chunk_index < 0 {
            return Err(FeedError::invalid_argument(OPERATION, "chunk_index must be >= 0"));
        }

        let file_name = upload
            .file_name
            .as_deref()
            .and_then(non_blank)
            .unwrap_or_else(|| DEFAULT_AUDIO_FILE_NAME.to_string());

        let mut parts = vec![
            FormPart::file("audio", file_name, upload.audio),
            FormPart::text("proId", pro_id),
            FormPart::text("sessionId", session_id),
            FormPart::text("chunkIndex", upload.chunk_index.to_string()),
        ];
        if upload.sample_rate > 0 {
            parts.push(FormPart::text("sampleRate", upload.sample_rate.to_string()));
        }

        let request = self
            .build_request(Method::POST, "/api/speech/upload", &[], &Headers::new())
            .with_multipart(parts);
        self.execute_json(OPERATION, request).await
    }

    /// POST /api/speech/text
    ///
    /// The server's reply shape varies, so it comes back as raw JSON.
    pub async fn upload_speech_text(
        &self,
        upload: &SpeechTextUpload,
    ) -> FeedResult<serde_json::Value> {
        const OPERATION: &str = "upload_speech_text";
        require_pro_id(OPERATION, &upload.pro_id)?;
        require_session_id(OPERATION, &upload.session_id)?;
        if upload.chunk_index < 0 {
            return Err(FeedError::invalid_argument(OPERATION, "chunk_index must be >= 0"));
        }
        if non_blank(&upload.text).is_none() {
            return Err(FeedError::invalid_argument(OPERATION, "text must not be empty"));
        }

        let body = serde_json::to_vec(upload)
            .map_err(|source| FeedError::Decode { operation: OPERATION, source })?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let request = self
            .build_request(Method::POST, "/api/speech/text", &[], &headers)
            .with_body(body);
        self.execute_json(OPERATION, request).await
    }

    /// GET /api/speech/status?id=
    pub async fn get_speech_status_by_id(&self, id: i64) -> FeedResult<SpeechStatusResponse> {
        const OPERATION: &str = "get_speech_status_by_id";
        if id <= 0 {
            return Err(FeedError::invalid_argument(OPERATION, "id must be > 0"));
        }

        let request = self.build_request(
            Method::GET,
            "/api/speech/status",
            &[("id", id.to_string())],
            &Headers::new(),
        );
        self.execute_json(OPERATION, request).await
    }

    /// GET /api/speech/status?sessionId=&chunkIndex=
    ///
    /// `pro_id` narrows the lookup when non-blank.
    pub async fn get_speech_status_by_key(
        &self,
        pro_id: &str,
        session_id: &str,
        chunk_index: i64,
    ) -> FeedResult<SpeechStatusResponse> {
        const OPERATION: &str = "get_speech_status_by_key";
        let session_id = require_session_id(OPERATION, session_id)?;
        if chunk_index < 0 {
            return Err(FeedError::invalid_argument(OPERATION, "chunk_index must be >= 0"));
        }

        let mut query = Vec::with_capacity(3);
        if let Some(pro_id) = non_blank(pro_id) {
            query.push(("proId", pro_id));
        }
        query.push(("sessionId", session_id));
        query.push(("chunkIndex", chunk_index.to_string()));

        let request =
            self.build_request(Method::GET, "/api/speech/status", &query, &Headers::new());
        self.execute_json(OPERATION, request).await
    }

    // ---- Wallets ----

    /// POST /api/crypto/pro-wallet/create
    ///
    /// `admin_key` goes out as `X-Manax-Key` when non-blank.
    pub async fn create_pro_wallet(&self, admin_key: &str) -> FeedResult<CreateProWalletResponse> {
        const OPERATION: &str = "create_pro_wallet";
        let mut headers = Headers::new();
        if let Some(key) = non_blank(admin_key) {
            headers.insert(ADMIN_KEY_HEADER.to_string(), key);
        }

        let request =
            self.build_request(Method::POST, "/api/crypto/pro-wallet/create", &[], &headers);
        self.execute_json(OPERATION, request).await
    }

    /// GET /api/crypto/pro-wallet/verify
    pub async fn verify_pro_wallet(
        &self,
        pro_id: &str,
        token: &str,
    ) -> FeedResult<VerifyProWalletResponse> {
        const OPERATION: &str = "verify_pro_wallet";
        let pro_id = require_pro_id(OPERATION, pro_id)?;
        let token = non_blank(token)
            .ok_or_else(|| FeedError::invalid_argument(OPERATION, "token must not be empty"))?;

        let request = self.build_request(
            Method::GET,
            "/api/crypto/pro-wallet/verify",
            &[("proId", pro_id), ("token", token)],
            &Headers::new(),
        );
        self.execute_json(OPERATION, request).await
    }
}

impl std::fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedClient")
            .field("base_url", &self.base_url.as_str())
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Trimmed, non-empty pro id or an invalid-argument error.
pub(crate) fn require_pro_id(operation: &'static str, pro_id: &str) -> FeedResult<String> {
    non_blank(pro_id)
        .ok_or_else(|| FeedError::invalid_argument(operation, "pro_id must not be empty"))
}

fn require_session_id(operation: &'static str, session_id: &str) -> FeedResult<String> {
    non_blank(session_id)
        .ok_or_else(|| FeedError::invalid_argument(operation, "session_id must not be empty"))
}

fn push_limit(query: &mut Vec<(&'static str, String)>, limit: u32) {
    if limit > 0 {
        query.push(("limit", limit.to_string()));
    }
}

fn parse_base_url(raw: &str) -> FeedResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FeedError::Config("base URL must not be empty".to_string()));
    }

    let mut url = Url::parse(raw)
        .map_err(|e| FeedError::Config(format!("invalid base URL {:?}: {}", raw, e)))?;
    if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
        return Err(FeedError::Config(format!(
            "base URL must include scheme and host: {:?}",
            raw
        )));
    }

    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
