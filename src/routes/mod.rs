use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use serde::{Deserialize, Serialize};

use crate::services::{ServiceError, ServiceResult};

pub mod products;

/// Body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ProductNotFound => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::NameRequired
            | ServiceError::TagNotFound
            | ServiceError::MissingField(_)
            | ServiceError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorMessage {
            message: self.to_string(),
        })
    }
}

/// Register the product endpoints.
///
/// Bodies are taken as raw bytes and read by the services, so that an update
/// of a missing product is reported as such whatever the body holds.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(path_config())
        .service(products::list_products)
        .service(products::show_product)
        .service(products::create_product)
        .service(products::update_product);
}

/// Ids that do not parse as a key cannot name a product.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req| ServiceError::ProductNotFound.into())
}

/// Run blocking store work on the actix thread pool.
async fn run_blocking<T, F>(work: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(work)
        .await
        .unwrap_or_else(|err| Err(ServiceError::Internal(err.to_string())))
}

/// Turn a service failure into a response, logging it at a level that
/// matches who caused it.
fn failure_response(action: &str, err: ServiceError) -> HttpResponse {
    match &err {
        ServiceError::Internal(detail) => log::error!("Failed to {action}: {detail}"),
        other => log::debug!("Rejected request to {action}: {other}"),
    }
    err.error_response()
}
