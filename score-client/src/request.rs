use std::sync::LazyLock;
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use score_types::{ErrorPayload, ResponseData, User};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::ClientError;

/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Client behind the free [`get`] and [`post`] functions.
/// No timeout and no idle pool: every call opens its own connection and
/// waits for exactly one completion.
static DEFAULT_CLIENT: LazyLock<HttpClient> = LazyLock::new(|| {
    HttpClient::from_builder(Client::builder().pool_max_idle_per_host(0))
        .expect("Failed to create HTTP client")
});

/// A completed HTTP exchange: the status code and the JSON-parsed body.
///
/// Non-2xx statuses are returned here as well; callers branch on `status`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T = Value> {
    /// HTTP status code of the response
    pub status: StatusCode,
    /// Parsed response body
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Whether the status is in the 2xx range
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl ApiResponse<Value> {
    /// Decodes the JSON body into a concrete type, keeping the status.
    ///
    /// # Errors
    /// Returns [`ClientError::UnexpectedBody`] if the body does not match `U`
    pub fn decode<U>(self) -> Result<ApiResponse<U>, ClientError>
    where
        U: DeserializeOwned,
    {
        let status = self.status;
        let data = serde_json::from_value(self.data)
            .map_err(|source| ClientError::UnexpectedBody { status, source })?;

        Ok(ApiResponse { status, data })
    }

    /// Interprets the body as a [`User`] on 2xx and as an [`ErrorPayload`]
    /// on every other status.
    ///
    /// # Errors
    /// Returns [`ClientError::UnexpectedBody`] if the body does not match the
    /// shape implied by the status
    pub fn into_response_data(self) -> Result<ApiResponse<ResponseData>, ClientError> {
        if self.is_success() {
            let response = self.decode::<User>()?;
            Ok(ApiResponse {
                status: response.status,
                data: ResponseData::User(response.data),
            })
        } else {
            let response = self.decode::<ErrorPayload>()?;
            Ok(ApiResponse {
                status: response.status,
                data: ResponseData::Error(response.data),
            })
        }
    }
}

/// JSON HTTP client with connection pooling and request tracing
#[derive(Clone)]
pub struct HttpClient {
    http_client: ClientWithMiddleware,
}

impl HttpClient {
    /// Builds a client. `timeout` bounds each whole request; `None` waits
    /// indefinitely.
    ///
    /// # Errors
    /// Returns an error if the underlying TLS backend cannot be initialised
    pub fn build(timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder().pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self::from_builder(builder)
    }

    fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self, ClientError> {
        let reqwest_client = builder
            .user_agent(format!("score-client/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self { http_client })
    }

    /// Issues a GET request to `url`.
    ///
    /// # Errors
    /// Returns an error if the request fails in transport or the body is not
    /// valid JSON. HTTP error statuses are not errors.
    pub async fn get(&self, url: &str) -> Result<ApiResponse, ClientError> {
        tracing::debug!(method = "GET", url, "Sending request");

        let response = self.http_client.get(url).send().await?;

        read_json(response).await
    }

    /// Serializes `data` and POSTs it to `url` as `application/json`.
    ///
    /// # Errors
    /// Returns an error if `data` cannot be serialized, the request fails in
    /// transport, or the body is not valid JSON. HTTP error statuses are not
    /// errors.
    pub async fn post<T>(&self, url: &str, data: &T) -> Result<ApiResponse, ClientError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let json_body = serde_json::to_vec(data).map_err(ClientError::Serialize)?;

        tracing::debug!(method = "POST", url, "Sending request");

        let response = self
            .http_client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(json_body)
            .send()
            .await?;

        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<ApiResponse, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    let data = serde_json::from_slice(&body).map_err(|source| {
        tracing::warn!(status = status.as_u16(), "Response body is not valid JSON");
        ClientError::MalformedBody { status, source }
    })?;

    tracing::debug!(status = status.as_u16(), "Received response");

    Ok(ApiResponse { status, data })
}

/// Issues a GET request to `url` on the shared client.
///
/// Resolves for every HTTP status; see [`HttpClient::get`].
///
/// # Errors
/// Returns an error if the request fails in transport or the body is not
/// valid JSON
pub async fn get(url: &str) -> Result<ApiResponse, ClientError> {
    DEFAULT_CLIENT.get(url).await
}

/// POSTs `data` as JSON to `url` on the shared client.
///
/// Resolves for every HTTP status; see [`HttpClient::post`].
///
/// # Errors
/// Returns an error if `data` cannot be serialized, the request fails in
/// transport, or the body is not valid JSON
pub async fn post<T>(url: &str, data: &T) -> Result<ApiResponse, ClientError>
where
    T: Serialize + ?Sized + Sync,
{
    DEFAULT_CLIENT.post(url, data).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Verifies that the shared HTTP client can be created successfully.
    #[test]
    fn test_http_client_initialization() {
        let _ = &*DEFAULT_CLIENT;
    }

    #[test]
    fn test_http_client_with_timeout() {
        assert!(HttpClient::build(Some(Duration::from_secs(5))).is_ok());
    }

    #[test]
    fn test_success_body_is_user() {
        let response = ApiResponse {
            status: StatusCode::OK,
            data: json!({ "id": "alice", "score": 5 }),
        };

        let response = response.into_response_data().unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.data,
            ResponseData::User(User {
                id: "alice".to_string(),
                score: 5.0,
            })
        );
    }

    #[test]
    fn test_failure_body_is_error_payload() {
        let response = ApiResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            data: json!({ "Error": "database unavailable" }),
        };

        let response = response.into_response_data().unwrap();
        assert!(!response.is_success());
        assert_eq!(
            response.data,
            ResponseData::Error(ErrorPayload::new("database unavailable"))
        );
    }

    #[test]
    fn test_shape_mismatch_keeps_status() {
        let response = ApiResponse {
            status: StatusCode::BAD_REQUEST,
            data: json!({ "id": "alice", "score": 5 }),
        };

        let err = response.into_response_data().unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedBody { .. }));
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_unserializable_payload() {
        // Maps with non-string keys have no JSON representation
        let mut data = std::collections::HashMap::new();
        data.insert((1, 2), "value");

        let result = post("http://127.0.0.1:9/never", &data).await;

        assert!(matches!(result, Err(ClientError::Serialize(_))));
    }
}
