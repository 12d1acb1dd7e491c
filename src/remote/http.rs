//! REST client of the platform's admin API.
//!
//! Every collection is addressed as `{base_url}/{collection}` and every
//! entity as `{base_url}/{collection}/{id}`. Responses may come wrapped in a
//! `{success, data}` envelope or bare; both are accepted. Uploads go to
//! `{base_url}/uploads/{file_name}` with the raw file as body.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use crate::{
    config, debug,
    error::GatewayError,
    remote::Remote,
    types::{Ack, Entity, EntityEnvelope, EntityId, Fields, ListEnvelope, ListPage, ListParams},
    utils,
};

/// Client of the platform's REST API.
///
/// One instance serves every collection; the collection name is the first
/// path segment under the base URL. The client is cheap to clone and shares
/// its connection pool between clones.
///
/// # Authentication
///
/// When a token is configured it is sent as `Authorization: Bearer <token>`
/// with every request. There is no login flow; the token is taken as is.
///
/// # Error Mapping
///
/// | Response | Error |
/// |---|---|
/// | connection or TLS failure | [`GatewayError::Transport`] |
/// | 404 for a request naming an id | [`GatewayError::NotFound`] |
/// | 400 / 422, or `success: false` | [`GatewayError::Rejected`] with the server message |
/// | any other non-2xx | [`GatewayError::Status`] |
/// | body that does not decode | [`GatewayError::Decode`] |
///
/// Requests are neither retried nor given a timeout beyond reqwest's
/// defaults.
///
/// # Example
///
/// ```
/// let remote = HttpRemote::new("https://lms.example.com/api", Some(token));
/// let page = remote.list("courses", &ListParams::all()).await?;
/// println!("{} courses on {} pages", page.items.len(), page.total_pages);
/// ```
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemote {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root URL of the API, e.g. `https://lms.example.com/api`.
    ///   Trailing slashes are removed.
    /// * `token` - Optional bearer token sent with every request
    ///
    /// # Example
    ///
    /// ```
    /// let remote = HttpRemote::new("http://127.0.0.1:8787/", None);
    /// assert_eq!(remote.base_url(), "http://127.0.0.1:8787");
    /// ```
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Builds a client from `LMSADM_API_URL` and `LMSADM_API_TOKEN`.
    ///
    /// # Returns
    ///
    /// - `Some(HttpRemote)` - an API URL is configured
    /// - `None` - no API URL is set; the caller should fall back to the
    ///   local store
    ///
    /// # Example
    ///
    /// ```
    /// let remote: Box<dyn Remote> = match HttpRemote::from_config() {
    ///     Some(http) => Box::new(http),
    ///     None => Box::new(LocalRemote::open(config::data_dir())),
    /// };
    /// ```
    pub fn from_config() -> Option<Self> {
        config::api_url().map(|url| Self::new(url, config::api_token()))
    }

    /// Root URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a request to `{base_url}/{path}` with the bearer token attached.
    /// The request line is printed when `LMSADM_DEBUG` is set.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!("{} {}", method, url);
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Maps non-success responses onto the gateway taxonomy. `id` names the
/// entity a 404 refers to; without one a 404 is a plain status error.
async fn check(response: Response, id: Option<&EntityId>) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(GatewayError::NotFound(id.clone())),
        (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
            let message = response
                .json::<Ack>()
                .await
                .ok()
                .and_then(|ack| ack.message)
                .unwrap_or_else(|| status.to_string());
            Err(GatewayError::Rejected(message))
        }
        _ => Err(GatewayError::Status(status.as_u16())),
    }
}

async fn read_entity(response: Response) -> Result<Entity, GatewayError> {
    match response.json::<EntityEnvelope>().await? {
        EntityEnvelope::Wrapped { success: false, .. } => Err(GatewayError::Rejected(
            "server reported failure".to_string(),
        )),
        envelope => Ok(envelope.into_entity()),
    }
}

#[async_trait]
impl Remote for HttpRemote {
    async fn list(&self, collection: &str, params: &ListParams) -> Result<ListPage, GatewayError> {
        let response = self
            .request(Method::GET, collection)
            .query(&params.to_query())
            .send()
            .await?;
        let envelope = check(response, None).await?.json::<ListEnvelope>().await?;

        if !envelope.success {
            return Err(GatewayError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "server reported failure".to_string()),
            ));
        }

        Ok(ListPage {
            items: envelope.data,
            total_pages: envelope.total_pages,
        })
    }

    async fn fetch(&self, collection: &str, id: &EntityId) -> Result<Entity, GatewayError> {
        let response = self
            .request(Method::GET, &format!("{}/{}", collection, id))
            .send()
            .await?;
        read_entity(check(response, Some(id)).await?).await
    }

    async fn create(&self, collection: &str, fields: &Fields) -> Result<Entity, GatewayError> {
        let response = self
            .request(Method::POST, collection)
            .json(fields)
            .send()
            .await?;
        read_entity(check(response, None).await?).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &EntityId,
        fields: &Fields,
    ) -> Result<Entity, GatewayError> {
        let response = self
            .request(Method::PATCH, &format!("{}/{}", collection, id))
            .json(fields)
            .send()
            .await?;
        read_entity(check(response, Some(id)).await?).await
    }

    async fn delete(&self, collection: &str, id: &EntityId) -> Result<(), GatewayError> {
        let response = self
            .request(Method::DELETE, &format!("{}/{}", collection, id))
            .send()
            .await?;
        let body = check(response, Some(id)).await?.text().await?;

        // 204 and empty bodies count as success
        if body.trim().is_empty() {
            return Ok(());
        }
        let ack: Ack =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        if ack.success {
            Ok(())
        } else {
            Err(GatewayError::Rejected(
                ack.message
                    .unwrap_or_else(|| "server reported failure".to_string()),
            ))
        }
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, GatewayError> {
        let path = format!("uploads/{}", utils::sanitize_file_name(file_name));
        let response = self.request(Method::POST, &path).body(bytes).send().await?;
        let ack = check(response, None).await?.json::<Ack>().await?;

        match ack {
            Ack {
                success: true,
                url: Some(url),
                ..
            } => Ok(url),
            Ack { success: true, .. } => {
                Err(GatewayError::Decode("upload response without url".to_string()))
            }
            Ack { message, .. } => Err(GatewayError::Rejected(
                message.unwrap_or_else(|| "upload rejected".to_string()),
            )),
        }
    }
}
