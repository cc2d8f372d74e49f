//! Catalog REST API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff on reads (writes go out once)
//! - Bearer token from the injected [`SessionContext`] on every request
//! - Session teardown and a redirect to login on any 401

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Author, AuthorInput, AuthorListResponse, AuthorStat, JournalStat, LoginRequest, LoginResponse,
    MessageResponse, Overview, Paper, PaperBrowseResponse, PaperEnvelope, PaperInput,
    PaperSearchResponse, Profile, RegisterRequest, YearCount,
};
use crate::query::{BrowseRequest, SearchRequest};
use crate::session::SessionContext;

/// Page size used when an author has to be located by scanning the listing.
const AUTHOR_SCAN_LIMIT: u32 = 1000;

/// Catalog API client.
#[derive(Clone)]
pub struct CatalogClient {
    /// HTTP client for reads, with retry middleware.
    reads: ClientWithMiddleware,

    /// HTTP client for writes, without retries.
    writes: ClientWithMiddleware,

    /// API base URL, without trailing slash.
    base_url: String,

    /// Session supplying the bearer token.
    session: SessionContext,

    /// Debounce window for text-driven requests made on top of this client.
    debounce: Duration,
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or HTTP client initialization fails.
    pub fn new(config: &Config, session: SessionContext) -> anyhow::Result<Self> {
        url::Url::parse(&config.api_url)?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(200), Duration::from_secs(5))
            .build_with_max_retries(config.max_read_retries);

        let reads = ClientBuilder::new(client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let writes = ClientBuilder::new(client).build();

        Ok(Self {
            reads,
            writes,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            debounce: config.debounce,
        })
    }

    /// Session this client authenticates with.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Debounce window for text-driven requests.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---------------------------------------------------------------------
    // Auth
    // ---------------------------------------------------------------------

    /// Exchange credentials for a token. Does not start a session.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        self.send_json(Method::POST, "/auth/login", &body).await
    }

    /// Create an account.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<MessageResponse> {
        self.send_json(Method::POST, "/auth/register", request).await
    }

    /// Ask for password reset instructions.
    pub async fn forgot_password(&self, email: &str) -> ClientResult<MessageResponse> {
        let body = serde_json::json!({ "email": email });
        self.send_json(Method::POST, "/auth/forgot-password", &body).await
    }

    /// Fetch the signed-in user's profile.
    pub async fn get_profile(&self) -> ClientResult<Profile> {
        self.get("/auth/profile", &[]).await
    }

    /// Update the signed-in user's profile.
    pub async fn update_profile(&self, profile: &Profile) -> ClientResult<Profile> {
        self.send_json(Method::PUT, "/auth/profile", profile).await
    }

    // ---------------------------------------------------------------------
    // Papers
    // ---------------------------------------------------------------------

    /// Unfiltered, server-paged listing.
    pub async fn browse_papers(&self, request: &BrowseRequest) -> ClientResult<PaperBrowseResponse> {
        self.get("/papers", &request.to_params()).await
    }

    /// Text and filter search. Returns every match.
    pub async fn search_papers(&self, request: &SearchRequest) -> ClientResult<PaperSearchResponse> {
        self.get("/papers/search", &request.to_params()).await
    }

    /// Get a single paper by ID.
    pub async fn get_paper(&self, paper_id: &str) -> ClientResult<Paper> {
        let envelope: PaperEnvelope = self.get(&format!("/papers/{paper_id}"), &[]).await?;
        Ok(envelope.into_paper())
    }

    /// Create a paper.
    pub async fn create_paper(&self, paper: &PaperInput) -> ClientResult<()> {
        self.send_write(Method::POST, "/papers", Some(paper)).await
    }

    /// Replace a paper's editable fields.
    pub async fn update_paper(&self, paper_id: &str, paper: &PaperInput) -> ClientResult<()> {
        self.send_write(Method::PUT, &format!("/papers/{paper_id}"), Some(paper)).await
    }

    /// Delete a paper.
    pub async fn delete_paper(&self, paper_id: &str) -> ClientResult<()> {
        self.send_write::<()>(Method::DELETE, &format!("/papers/{paper_id}"), None).await
    }

    /// Create many papers in one request.
    pub async fn bulk_create_papers(&self, papers: &[PaperInput]) -> ClientResult<()> {
        self.send_write(Method::POST, "/papers/bulk", Some(papers)).await
    }

    // ---------------------------------------------------------------------
    // Authors
    // ---------------------------------------------------------------------

    /// Server-paged author listing.
    pub async fn browse_authors(&self, request: &BrowseRequest) -> ClientResult<AuthorListResponse> {
        self.get("/authors", &request.to_params()).await
    }

    /// Author name search.
    pub async fn search_authors(&self, request: &SearchRequest) -> ClientResult<AuthorListResponse> {
        self.get("/authors/search", &request.to_params()).await
    }

    /// Locate an author by ID.
    ///
    /// The backend has no single-author endpoint, so this scans one large
    /// listing page.
    pub async fn find_author(&self, author_id: &str) -> ClientResult<Author> {
        let request = BrowseRequest::new(1, AUTHOR_SCAN_LIMIT, "name");
        let listing = self.browse_authors(&request).await?;
        listing
            .authors
            .into_iter()
            .find(|a| a.author_id == author_id)
            .ok_or_else(|| ClientError::not_found(format!("author {author_id}")))
    }

    /// Create an author.
    pub async fn create_author(&self, author: &AuthorInput) -> ClientResult<()> {
        self.send_write(Method::POST, "/authors", Some(author)).await
    }

    /// Rename an author.
    pub async fn update_author(&self, author_id: &str, author: &AuthorInput) -> ClientResult<()> {
        self.send_write(Method::PUT, &format!("/authors/{author_id}"), Some(author)).await
    }

    /// Delete an author.
    pub async fn delete_author(&self, author_id: &str) -> ClientResult<()> {
        self.send_write::<()>(Method::DELETE, &format!("/authors/{author_id}"), None).await
    }

    // ---------------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------------

    /// Dashboard overview.
    pub async fn overview(&self) -> ClientResult<Overview> {
        self.get("/stats/overview", &[]).await
    }

    /// Authors ranked by paper count.
    pub async fn author_stats(&self) -> ClientResult<Vec<AuthorStat>> {
        self.get("/stats/authors", &[]).await
    }

    /// Per-journal aggregates.
    pub async fn journal_stats(&self) -> ClientResult<Vec<JournalStat>> {
        self.get("/stats/journals", &[]).await
    }

    /// Papers per publication year.
    pub async fn papers_per_year(&self) -> ClientResult<Vec<YearCount>> {
        self.get("/stats/papers-per-year", &[]).await
    }

    // ---------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Make a GET request.
    async fn get<T>(&self, path: &str, params: &[(&'static str, String)]) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(method = "GET", path, "Sending request");

        let request = self.reads.get(self.url(path)).query(params);
        let response = self.authorize(request).await.send().await?;
        let response = self.handle_response(response).await?;

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    /// Make a write request and decode its JSON answer.
    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.dispatch_write(method, path, Some(body)).await?;
        let bytes = response.bytes().await?;
        // Empty acknowledgements decode as `{}`.
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) { b"{}" } else { &bytes };
        serde_json::from_slice(bytes).map_err(ClientError::from)
    }

    /// Make a write request whose answer body is not needed.
    async fn send_write<B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.dispatch_write(method, path, body).await.map(|_| ())
    }

    async fn dispatch_write<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(method = %method, path, "Sending request");

        let mut request = self.writes.request(method, self.url(path));
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        let response = self.authorize(request).await.send().await?;
        self.handle_response(response).await
    }

    /// Handle API response status codes.
    async fn handle_response(&self, response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = backend_message(&text);
        tracing::debug!(status = status.as_u16(), %message, "Request failed");

        match status {
            StatusCode::UNAUTHORIZED => {
                self.session.expire().await;
                Err(ClientError::unauthorized(message))
            }
            StatusCode::NOT_FOUND => Err(ClientError::not_found(message)),
            StatusCode::BAD_REQUEST => Err(ClientError::bad_request(message)),
            s if s.is_server_error() => Err(ClientError::server(s.as_u16(), message)),
            s => Err(ClientError::UnexpectedStatus { status: s.as_u16(), message }),
        }
    }
}

/// Pull `message` out of a JSON error body, or fall back to the raw text.
fn backend_message(body: &str) -> String {
    serde_json::from_str::<MessageResponse>(body)
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| body.trim().to_string())
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient").field("base_url", &self.base_url).finish()
    }
}
