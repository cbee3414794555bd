use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json, Request};
use tracing::warn;

use crate::application::errors::ApiError;
use crate::domain::errors::ValidationError;

/// JSON body extractor whose rejections are reported as `400 {detail}`
/// instead of axum's plain-text 415/422 responses.
#[derive(Debug)]
pub struct JsonPayload<T>(pub T);

impl<S, T> FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
    T: Send + 'static,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(payload)) => Ok(Self(payload)),
            Err(rejection) => {
                warn!(error = %rejection.body_text(), "failed to parse JSON payload");
                Err(ValidationError::MalformedBody(rejection.body_text()).into())
            }
        }
    }
}
