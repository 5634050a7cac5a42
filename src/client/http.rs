//! HTTP implementation of the cafe API client.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Cafe, CafeAttributes, CafeClient, CafeId, ClientError};

type Result<T> = std::result::Result<T, ClientError>;

/// Username and password used to obtain an API token.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    token: String,
}

// GET /cafes/{id} answers with a list, older servers with a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Cafe>),
    One(Cafe),
}

/// Client for the HashiCups cafe API.
///
/// Cheap to clone and safe to share across tasks.
#[derive(Debug, Clone)]
pub struct HttpCafeClient {
    /// Base URL of the API, without a trailing slash.
    base_url: String,
    /// Token sent in the `Authorization` header, if signed in.
    token: Option<String>,
    /// HTTP client for making requests.
    client: reqwest::Client,
}

impl HttpCafeClient {
    /// Create an anonymous client for the API at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Use an already issued API token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Create a client and, when credentials are given, sign in with them.
    pub async fn connect(
        base_url: impl Into<String>,
        credentials: Option<&Credentials>,
    ) -> Result<Self> {
        let client = Self::new(base_url);
        match credentials {
            Some(credentials) => client.sign_in(credentials).await,
            None => Ok(client),
        }
    }

    /// Exchange credentials for a token and keep it for later requests.
    pub async fn sign_in(mut self, credentials: &Credentials) -> Result<Self> {
        debug!(username = %credentials.username, "Signing in to cafe API");
        let builder = self.client.post(self.build_url("/signin")).json(credentials);
        let response: SignInResponse = self.send(builder).await?;
        self.token = Some(response.token);
        Ok(self)
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the client holds an API token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn build_url(&self, path: &str) -> String {
        self.base_url.clone() + path
    }

    fn enable_auth_for_request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T> {
        let body = self.send_raw(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_raw(&self, builder: reqwest::RequestBuilder) -> Result<String> {
        let response = self.enable_auth_for_request(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait::async_trait]
impl CafeClient for HttpCafeClient {
    async fn create(&self, cafe: &CafeAttributes) -> Result<Cafe> {
        let builder = self.client.post(self.build_url("/cafes")).json(cafe);
        self.send(builder).await
    }

    async fn get_by_id(&self, id: CafeId) -> Result<Vec<Cafe>> {
        let builder = self.client.get(self.build_url(&format!("/cafes/{}", id)));
        match self.send::<OneOrMany>(builder).await {
            Ok(OneOrMany::Many(cafes)) => Ok(cafes),
            Ok(OneOrMany::One(cafe)) => Ok(vec![cafe]),
            Err(ClientError::Status { status: 404, .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn list_all(&self) -> Result<Vec<Cafe>> {
        let builder = self.client.get(self.build_url("/cafes"));
        self.send(builder).await
    }

    async fn update(&self, id: CafeId, cafe: &Cafe) -> Result<Cafe> {
        let builder = self
            .client
            .put(self.build_url(&format!("/cafes/{}", id)))
            .json(cafe);
        self.send(builder).await
    }

    async fn delete(&self, id: CafeId) -> Result<()> {
        let builder = self.client.delete(self.build_url(&format!("/cafes/{}", id)));
        self.send_raw(builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpCafeClient::new("http://localhost:19090/");
        assert_eq!(client.base_url(), "http://localhost:19090");
        assert_eq!(client.build_url("/cafes"), "http://localhost:19090/cafes");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("education", "test123"));
        assert!(debug.contains("education"));
        assert!(!debug.contains("test123"));
    }

    #[test]
    fn test_with_token() {
        let client = HttpCafeClient::new("http://localhost:19090");
        assert!(!client.is_authenticated());
        assert!(client.with_token("abc").is_authenticated());
    }

    #[test]
    fn test_one_or_many_decoding() {
        let many: OneOrMany = serde_json::from_str(r#"[{"id": 1, "name": "a"}]"#).unwrap();
        assert!(matches!(many, OneOrMany::Many(ref v) if v.len() == 1));

        let one: OneOrMany = serde_json::from_str(r#"{"id": 1, "name": "a"}"#).unwrap();
        assert!(matches!(one, OneOrMany::One(ref c) if c.id == 1));
    }
}
