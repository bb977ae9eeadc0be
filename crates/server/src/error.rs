use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tableside_core::errors::{ApplicationError, DomainError, InterfaceError};
use tableside_core::CatalogUnavailable;
use tableside_db::repositories::RepositoryError;
use tracing::{error, warn};

/// Body returned for every failed API call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(InterfaceError::BadRequest {
            message: message.into(),
            correlation_id: correlation_id(),
        })
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self(InterfaceError::NotFound {
            message: message.into(),
            correlation_id: correlation_id(),
        })
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self(InterfaceError::Conflict {
            message: message.into(),
            correlation_id: correlation_id(),
        })
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `Json` extractor whose rejections (bad syntax, wrong types, missing fields,
/// wrong content type) come back as a 400 [`ErrorBody`].
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

fn correlation_id() -> String {
    format!("req-{}", uuid::Uuid::new_v4().simple())
}

impl From<ApplicationError> for ApiError {
    fn from(value: ApplicationError) -> Self {
        Self(value.into_interface(correlation_id()))
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<CatalogUnavailable> for ApiError {
    fn from(value: CatalogUnavailable) -> Self {
        ApplicationError::from(value).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let interface = self.0;
        let correlation_id = interface.correlation_id().to_string();

        // Client errors carry their detail; server-side failures only the safe message.
        let message = match &interface {
            InterfaceError::BadRequest { message, .. }
            | InterfaceError::NotFound { message, .. }
            | InterfaceError::Conflict { message, .. } => {
                warn!(
                    event_name = "api.request.rejected",
                    correlation_id = %correlation_id,
                    status = status.as_u16(),
                    error = %message,
                    "request rejected"
                );
                message.clone()
            }
            InterfaceError::ServiceUnavailable { message, .. }
            | InterfaceError::Internal { message, .. } => {
                error!(
                    event_name = "api.request.failed",
                    correlation_id = %correlation_id,
                    status = status.as_u16(),
                    error = %message,
                    "request failed"
                );
                interface.user_message().to_string()
            }
        };

        (status, Json(ErrorBody { error: message, correlation_id })).into_response()
    }
}
