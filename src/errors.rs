use actix_web::HttpResponse;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("Sale {sale_id} was recorded without items")]
    Inconsistent { sale_id: Uuid },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::InvalidInput(msg) | DomainError::PaymentRejected(msg) => {
                AppError::BadRequest(msg)
            }
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::CheckoutInProgress => AppError::Conflict(e.to_string()),
            DomainError::OrphanedSale { sale_id, .. } => AppError::Inconsistent { sale_id },
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Unauthorized => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Conflict(_) => HttpResponse::Conflict().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Inconsistent { sale_id } => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": self.to_string(),
                    "sale_id": sale_id
                }))
            }
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound.error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn domain_invalid_input_maps_to_bad_request() {
        let app_err: AppError = DomainError::InvalidInput("bad value".to_string()).into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
        assert_eq!(app_err.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn payment_rejection_maps_to_bad_request() {
        let app_err: AppError = DomainError::PaymentRejected("short".to_string()).into();
        assert_eq!(app_err.to_string(), "short");
        assert_eq!(app_err.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn wrong_passphrase_maps_to_401() {
        let app_err: AppError = DomainError::Unauthorized.into();
        assert_eq!(app_err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn checkout_in_progress_maps_to_409() {
        let app_err: AppError = DomainError::CheckoutInProgress.into();
        assert_eq!(app_err.error_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn orphaned_sale_keeps_the_sale_id() {
        let sale_id = Uuid::new_v4();
        let app_err: AppError = DomainError::OrphanedSale {
            sale_id,
            reason: "timeout".to_string(),
        }
        .into();
        assert!(matches!(app_err, AppError::Inconsistent { sale_id: id } if id == sale_id));
        assert_eq!(
            app_err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_internal_maps_to_app_internal() {
        let app_err: AppError = DomainError::Internal("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
