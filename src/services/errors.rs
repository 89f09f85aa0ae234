use thiserror::Error;

use crate::domain::tag::MalformedTag;
use crate::forms::products::ProductFormError;
use crate::repository::RepositoryError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures returned by the catalog services.
///
/// The display text is the message sent to API clients.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("상품명이 필요합니다.")]
    NameRequired,
    #[error("상품을 찾을 수 없습니다.")]
    ProductNotFound,
    #[error("태그를 찾을 수 없습니다.")]
    TagNotFound,
    #[error("필수 필드가 누락되었습니다: {0}")]
    MissingField(String),
    #[error("잘못된 데이터 형식입니다: {0}")]
    InvalidFormat(String),
    /// Unexpected failure. The detail is for logs only.
    #[error("서버 오류가 발생했습니다.")]
    Internal(String),
}

impl ServiceError {
    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Internal(_))
    }
}

impl From<ProductFormError> for ServiceError {
    fn from(value: ProductFormError) -> Self {
        match value {
            ProductFormError::NameRequired => ServiceError::NameRequired,
            ProductFormError::MissingField(field) => ServiceError::MissingField(field.to_string()),
            ProductFormError::InvalidFormat(detail) => ServiceError::InvalidFormat(detail),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::ProductNotFound,
            RepositoryError::TagNotFound(_) => ServiceError::TagNotFound,
            RepositoryError::MalformedTag(MalformedTag::MissingName) => {
                ServiceError::MissingField("name".to_string())
            }
            RepositoryError::MalformedTag(MalformedTag::InvalidFormat(detail)) => {
                ServiceError::InvalidFormat(detail)
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
