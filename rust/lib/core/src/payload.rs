use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::ServiceError;

/// JSON request body extractor whose rejection uses the service error
/// envelope instead of axum's plain-text rejection.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(ServiceError::Validation(rejection.body_text())),
        }
    }
}
