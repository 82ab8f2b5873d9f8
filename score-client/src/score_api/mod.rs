use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use score_types::{ErrorPayload, ScoreUpdate, User};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::request::{ApiResponse, HttpClient};
use crate::types::Environment;

/// Bytes of a user id left unescaped in the URL path (RFC 3986 unreserved)
const USER_ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Outcome of a score backend call.
///
/// A `Failure` is a reply the backend chose to send (`400` bad request,
/// `500` server error), not a client error.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// 2xx reply carrying the resource
    Success {
        /// HTTP status code (`200` on update, `201` on create)
        status: StatusCode,
        /// Decoded body
        data: T,
    },
    /// Non-2xx reply carrying the backend's error message
    Failure {
        /// HTTP status code
        status: StatusCode,
        /// Decoded `{"Error": ...}` body
        error: ErrorPayload,
    },
}

impl<T> Reply<T> {
    /// HTTP status code of the reply
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Success { status, .. } | Self::Failure { status, .. } => *status,
        }
    }

    /// Converts into a `Result`, dropping the status code
    ///
    /// # Errors
    /// Returns the backend's error payload for a `Failure` reply
    pub fn into_result(self) -> Result<T, ErrorPayload> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure { error, .. } => Err(error),
        }
    }
}

impl<T> Reply<T>
where
    T: DeserializeOwned,
{
    /// Classifies an untyped response by its status code
    ///
    /// # Errors
    /// Returns [`ClientError::UnexpectedBody`] if the body does not have the
    /// shape implied by the status
    pub fn from_response(response: ApiResponse) -> Result<Self, ClientError> {
        if response.is_success() {
            let ApiResponse { status, data } = response.decode::<T>()?;
            Ok(Self::Success { status, data })
        } else {
            let ApiResponse { status, data } = response.decode::<ErrorPayload>()?;
            tracing::info!(
                status = status.as_u16(),
                error = %data.error,
                "Score backend rejected request"
            );
            Ok(Self::Failure {
                status,
                error: data,
            })
        }
    }
}

/// Trait for the score backend API
#[async_trait::async_trait]
pub trait ScoreApi: Send + Sync {
    /// Fetches a user by id
    async fn get_user(&self, id: &str) -> Result<Reply<User>, ClientError>;

    /// Creates a user; the backend replies `201` on success
    async fn create_user(&self, user: &User) -> Result<Reply<User>, ClientError>;

    /// Replaces a user's score; the backend replies `200` on success
    async fn update_score(&self, id: &str, score: f64) -> Result<Reply<User>, ClientError>;
}

/// HTTP implementation of [`ScoreApi`]
pub struct ScoreApiClient {
    base_url: String,
    http_client: HttpClient,
}

impl ScoreApiClient {
    /// Creates a client for the backend at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>, http_client: HttpClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            http_client,
        }
    }

    /// Creates a client configured from the environment
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn from_environment(environment: Environment) -> Result<Self, ClientError> {
        let http_client = HttpClient::build(Environment::request_timeout())?;

        Ok(Self::new(environment.score_api_url(), http_client))
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/users/{id}` with the id escaped as exactly one path segment.
    /// Empty and dot-segment ids are refused since URL normalisation would
    /// resolve them to a different resource.
    fn user_url(&self, id: &str) -> Result<String, ClientError> {
        if matches!(id, "" | "." | "..") {
            return Err(ClientError::InvalidUserId(id.to_string()));
        }

        Ok(format!(
            "{}/users/{}",
            self.base_url,
            utf8_percent_encode(id, USER_ID_SEGMENT)
        ))
    }
}

#[async_trait::async_trait]
impl ScoreApi for ScoreApiClient {
    async fn get_user(&self, id: &str) -> Result<Reply<User>, ClientError> {
        let response = self.http_client.get(&self.user_url(id)?).await?;
        Reply::from_response(response)
    }

    async fn create_user(&self, user: &User) -> Result<Reply<User>, ClientError> {
        let url = format!("{}/users", self.base_url);
        let response = self.http_client.post(&url, user).await?;
        Reply::from_response(response)
    }

    async fn update_score(&self, id: &str, score: f64) -> Result<Reply<User>, ClientError> {
        let response = self
            .http_client
            .post(&self.user_url(id)?, &ScoreUpdate { score })
            .await?;
        Reply::from_response(response)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! In-memory [`ScoreApi`] for tests

    use std::collections::HashMap;

    use reqwest::StatusCode;
    use score_types::{ErrorPayload, User};
    use tokio::sync::Mutex;

    use super::{ClientError, Reply, ScoreApi};

    /// Score backend held in memory, replying with the real backend's status codes
    #[derive(Default)]
    pub struct MockScoreApiClient {
        users: Mutex<HashMap<String, User>>,
    }

    impl MockScoreApiClient {
        /// Creates a mock pre-populated with `users`
        #[must_use]
        pub fn new(users: impl IntoIterator<Item = User>) -> Self {
            Self {
                users: Mutex::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
            }
        }

        fn rejected<T>(message: &str) -> Reply<T> {
            Reply::Failure {
                status: StatusCode::BAD_REQUEST,
                error: ErrorPayload::new(message),
            }
        }
    }

    #[async_trait::async_trait]
    impl ScoreApi for MockScoreApiClient {
        async fn get_user(&self, id: &str) -> Result<Reply<User>, ClientError> {
            let users = self.users.lock().await;
            Ok(users.get(id).map_or_else(
                || Self::rejected("user not found"),
                |user| Reply::Success {
                    status: StatusCode::OK,
                    data: user.clone(),
                },
            ))
        }

        async fn create_user(&self, user: &User) -> Result<Reply<User>, ClientError> {
            let mut users = self.users.lock().await;
            if users.contains_key(&user.id) {
                return Ok(Self::rejected("user already exists"));
            }
            users.insert(user.id.clone(), user.clone());
            Ok(Reply::Success {
                status: StatusCode::CREATED,
                data: user.clone(),
            })
        }

        async fn update_score(&self, id: &str, score: f64) -> Result<Reply<User>, ClientError> {
            let mut users = self.users.lock().await;
            let Some(user) = users.get_mut(id) else {
                return Ok(Self::rejected("user not found"));
            };
            user.score = score;
            Ok(Reply::Success {
                status: StatusCode::OK,
                data: user.clone(),
            })
        }
    }
}
