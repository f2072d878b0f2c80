use super::interceptors::{
    BearerAuth, DiagnosticLog, Interceptor, OutgoingRequest, ResponseInfo, SessionReset,
};
use super::normalizer::{Failure, classify_reqwest, normalize};
use super::request::{Payload, Query, RequestDescriptor, RequestOptions, Transport};
use super::status::is_success_status;
use crate::error::ApiError;
use crate::storage::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::store::Store;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("qick-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_prefix: String,
    pub timeout: Duration,
}

impl ClientSettings {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_prefix: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.get_base_url(),
            api_prefix: config.get_api_prefix(),
            timeout: Duration::from_secs(config.get_timeout_secs()),
        }
    }
}

/// REST client shared by every endpoint module.
///
/// All failures leave through the normalizer exactly once, and the
/// interceptors see them before the caller does.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    pub base_url: String,
    pub api_prefix: String,
    timeout: Duration,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("api_prefix", &self.api_prefix)
            .field("timeout", &self.timeout)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl HttpClient {
    /// Client without any interceptors.
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .default_headers(default_headers)
            .build()
            .map_err(|e| normalize(&classify_reqwest(&e)))?;

        Ok(HttpClient {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_prefix: settings.api_prefix.trim_end_matches('/').to_string(),
            timeout: settings.timeout,
            interceptors: Vec::new(),
        })
    }

    /// Client wired to `store`: bearer injection, forced logout on auth
    /// failures, then diagnostic logging.
    pub fn for_store(settings: ClientSettings, store: &Store) -> Result<Self, ApiError> {
        Ok(Self::new(settings)?
            .with_interceptor(BearerAuth::new(store.clone()))
            .with_interceptor(SessionReset::new(store.clone()))
            .with_interceptor(DiagnosticLog))
    }

    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_start_matches('/');
        format!("{}{}/{}", self.base_url, self.api_prefix, endpoint)
    }

    fn prepare(&self, descriptor: &RequestDescriptor) -> Result<OutgoingRequest, ApiError> {
        let transport = descriptor.transport();
        let mut headers = HeaderMap::new();

        // reqwest writes the multipart content type itself, boundary included
        if transport == Transport::Json {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(transport.content_type()),
            );
        }

        for (name, value) in &descriptor.options.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| malformed(name, e))?;
            let value = HeaderValue::from_str(value).map_err(|e| malformed(name.as_str(), e))?;
            headers.insert(name, value);
        }

        Ok(OutgoingRequest {
            method: descriptor.method.clone(),
            url: self.url_for(&descriptor.endpoint),
            transport,
            headers,
        })
    }

    /// Send one request and decode the JSON body into `T`.
    ///
    /// An empty body decodes as JSON `null`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ApiError> {
        let mut outgoing = match self.prepare(&descriptor) {
            Ok(outgoing) => outgoing,
            Err(error) => {
                let rejected = OutgoingRequest {
                    method: descriptor.method.clone(),
                    url: self.url_for(&descriptor.endpoint),
                    transport: descriptor.transport(),
                    headers: HeaderMap::new(),
                };
                for interceptor in &self.interceptors {
                    interceptor.on_error(&rejected, &error);
                }
                return Err(error);
            }
        };
        for interceptor in &self.interceptors {
            interceptor.on_request(&mut outgoing);
        }

        match self.send(&outgoing, descriptor).await {
            Ok((info, value)) => {
                for interceptor in &self.interceptors {
                    interceptor.on_response(&info);
                }
                Ok(value)
            }
            Err(error) => {
                for interceptor in &self.interceptors {
                    interceptor.on_error(&outgoing, &error);
                }
                Err(error)
            }
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        outgoing: &OutgoingRequest,
        descriptor: RequestDescriptor,
    ) -> Result<(ResponseInfo, T), ApiError> {
        let mut request = self
            .client
            .request(outgoing.method.clone(), &outgoing.url)
            .headers(outgoing.headers.clone());

        if !descriptor.query.is_empty() {
            request = request.query(&descriptor.query);
        }
        if let Some(timeout) = descriptor.options.timeout {
            request = request.timeout(timeout);
        }
        request = match descriptor.payload {
            Some(Payload::Json(body)) => request.json(&body),
            Some(Payload::Multipart(body)) => request.multipart(body.into_form()?),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| normalize(&classify_reqwest(&e)))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| normalize(&classify_reqwest(&e)))?;

        if !is_success_status(status) {
            return Err(normalize(&Failure::Response {
                status,
                body: error_body(&bytes),
            }));
        }

        let raw: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        let value = serde_json::from_slice::<T>(raw).map_err(|e| {
            normalize(&Failure::Other {
                message: Some(format!("Failed to parse response: {}", e)),
            })
        })?;

        let info = ResponseInfo {
            method: outgoing.method.clone(),
            url: outgoing.url.clone(),
            status,
        };
        Ok((info, value))
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<Query>,
        options: Option<RequestOptions>,
    ) -> Result<T, ApiError> {
        self.execute(
            RequestDescriptor::new(Method::GET, endpoint)
                .with_query(query.unwrap_or_default())
                .with_options(options),
        )
        .await
    }

    pub async fn create<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: Option<Payload>,
        options: Option<RequestOptions>,
    ) -> Result<T, ApiError> {
        self.execute(
            RequestDescriptor::new(Method::POST, endpoint)
                .with_payload(payload)
                .with_options(options),
        )
        .await
    }

    pub async fn replace<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: Option<Payload>,
        options: Option<RequestOptions>,
    ) -> Result<T, ApiError> {
        self.execute(
            RequestDescriptor::new(Method::PUT, endpoint)
                .with_payload(payload)
                .with_options(options),
        )
        .await
    }

    pub async fn partial_update<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: Option<Payload>,
        options: Option<RequestOptions>,
    ) -> Result<T, ApiError> {
        self.execute(
            RequestDescriptor::new(Method::PATCH, endpoint)
                .with_payload(payload)
                .with_options(options),
        )
        .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, ApiError> {
        self.execute(RequestDescriptor::new(Method::DELETE, endpoint).with_options(options))
            .await
    }
}

fn malformed(header: &str, error: impl std::fmt::Display) -> ApiError {
    normalize(&Failure::Other {
        message: Some(format!("Invalid header '{}': {}", header, error)),
    })
}

/// JSON body if it parses, the raw text otherwise, nothing if empty.
fn error_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(bytes).into_owned())))
}
