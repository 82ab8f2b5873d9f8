use serde::{ser::Error as _, Deserialize, Serialize, Serializer};

/// Largest magnitude below which every whole `f64` is an exact integer (2^53)
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes whole scores as JSON integers (`5`, not `5.0`) and refuses
/// NaN and infinities, which JSON cannot carry.
fn serialize_score<S>(score: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if !score.is_finite() {
        return Err(S::Error::custom(format!("score must be finite, got {score}")));
    }

    if score.fract() == 0.0 && score.abs() <= MAX_EXACT_INTEGER {
        return serializer.serialize_i64(*score as i64);
    }

    serializer.serialize_f64(*score)
}

/// A user record as served by the score backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
}

/// Body the backend sends with `400` and `500` responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "Error")]
    pub error: String,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Request body for updating an existing user's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
}

/// A response body interpreted by its status code.
///
/// The two shapes carry no tag of their own, so which variant applies is
/// decided by the caller from the HTTP status: 2xx means `User`, anything
/// else means `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    User(User),
    Error(ErrorPayload),
}
