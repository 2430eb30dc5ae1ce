//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::CustomerNotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::DispatchNotFound
            | Self::ProductNotFound
            | Self::RawMaterialNotFound
            | Self::BatchNotFound
            | Self::UserNotFound
            | Self::AlertNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (retryable allocator races included)
            Self::AlreadyExists
            | Self::CustomerEmailExists
            | Self::DuplicateDispatchId
            | Self::DispatchExists
            | Self::ProductItemIdExists
            | Self::RawMaterialItemIdExists
            | Self::UsernameExists
            | Self::TransactionConflict => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::AdminRequired
            | Self::CannotModifyAdmin
            | Self::CannotDeleteAdmin => StatusCode::FORBIDDEN,

            // 422 Unprocessable Entity (business rules)
            Self::CustomerHasOrders
            | Self::OrderItemForeign
            | Self::InsufficientMaterials
            | Self::UserCannotDeleteSelf
            | Self::ProductMatchNone
            | Self::ProductMatchAmbiguous => StatusCode::UNPROCESSABLE_ENTITY,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::OrderEmpty
            | Self::OrderInvalidStatus
            | Self::DispatchInvalidStatus
            | Self::ManifestEmpty
            | Self::ManifestInvalidQuantity
            | Self::BatchInvalidStatus
            | Self::RoleInvalid => StatusCode::BAD_REQUEST,

            // 503 Service Unavailable
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DuplicateDispatchId.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::ManifestEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
