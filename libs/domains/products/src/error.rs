use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ProductError {
    /// Every violated field rule, collected in one pass
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("No valid update data provided")]
    EmptyUpdate,

    #[error("Product with this name already exists")]
    DuplicateName(String),

    #[error("Invalid product ID")]
    InvalidIdentifier(String),

    #[error("Product not found")]
    NotFound(String),

    #[error("No products found matching the criteria")]
    NoMatches,

    #[error("Stored product {id} is malformed: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("Database error: {0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::EmptyUpdate => AppError::BadRequest(err.to_string()),
            ProductError::DuplicateName(_) => AppError::Duplicate(err.to_string()),
            ProductError::InvalidIdentifier(_) => AppError::InvalidId(err.to_string()),
            ProductError::NotFound(_) | ProductError::NoMatches => {
                AppError::NotFound(err.to_string())
            }
            ProductError::MalformedRecord { .. } => AppError::DatabaseDecode(err.to_string()),
            ProductError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}
