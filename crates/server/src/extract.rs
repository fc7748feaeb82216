use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use utils::validation::Validate;

use crate::error::ApiError;

/// JSON body that has been deserialized and passed its [`Validate`] rules.
/// Either failure is answered with a 400 listing the problems.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        let issues = value.validate();
        if !issues.is_empty() {
            return Err(ApiError::InvalidBody(issues));
        }
        Ok(Self(value))
    }
}
