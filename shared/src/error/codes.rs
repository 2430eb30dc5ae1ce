//! Unified error codes for the Tarp Mill backend
//!
//! This module defines all error codes used across the server and clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Customer errors
//! - 4xxx: Order errors
//! - 5xxx: Dispatch errors
//! - 6xxx: Inventory errors
//! - 7xxx: Production errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,
    /// Cannot modify admin user
    CannotModifyAdmin = 2003,
    /// Cannot delete admin user
    CannotDeleteAdmin = 2004,

    // ==================== 3xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 3001,
    /// Customer email already registered
    CustomerEmailExists = 3002,
    /// Customer has existing orders
    CustomerHasOrders = 3003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order item not found
    OrderItemNotFound = 4002,
    /// Order has no items
    OrderEmpty = 4003,
    /// Line item belongs to a different order
    OrderItemForeign = 4004,
    /// Invalid order status value
    OrderInvalidStatus = 4005,

    // ==================== 5xxx: Dispatch ====================
    /// Dispatch not found
    DispatchNotFound = 5001,
    /// Dispatch identifier already allocated (retryable)
    DuplicateDispatchId = 5002,
    /// Order already has a dispatch record
    DispatchExists = 5003,
    /// Invalid dispatch status value
    DispatchInvalidStatus = 5004,
    /// Delivery manifest is empty
    ManifestEmpty = 5005,
    /// Delivery manifest has an invalid quantity
    ManifestInvalidQuantity = 5006,

    // ==================== 6xxx: Inventory ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product item_id already exists
    ProductItemIdExists = 6002,
    /// No product matches the given attributes
    ProductMatchNone = 6003,
    /// More than one product matches the given attributes
    ProductMatchAmbiguous = 6004,
    /// Raw material not found
    RawMaterialNotFound = 6101,
    /// Raw material item_id already exists
    RawMaterialItemIdExists = 6102,

    // ==================== 7xxx: Production ====================
    /// Production batch not found
    BatchNotFound = 7001,
    /// Invalid production status value
    BatchInvalidStatus = 7002,
    /// Insufficient raw material stock for batch
    InsufficientMaterials = 7003,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// Cannot delete own account
    UserCannotDeleteSelf = 8003,
    /// Invalid role name
    RoleInvalid = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9003,
    /// Configuration error
    ConfigError = 9004,
    /// Store transaction conflict (retryable)
    TransactionConflict = 9005,
    /// Alert not found
    AlertNotFound = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Check if the caller may retry the same request verbatim
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::DuplicateDispatchId | ErrorCode::TransactionConflict | ErrorCode::TimeoutError
        )
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotModifyAdmin => "Cannot modify administrator user",
            ErrorCode::CannotDeleteAdmin => "Cannot delete administrator user",

            // Customer
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerEmailExists => "Customer email already registered",
            ErrorCode::CustomerHasOrders => "Customer has existing orders",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::OrderItemForeign => "Line item belongs to a different order",
            ErrorCode::OrderInvalidStatus => "Invalid order status value",

            // Dispatch
            ErrorCode::DispatchNotFound => "Dispatch not found",
            ErrorCode::DuplicateDispatchId => "Dispatch identifier already allocated",
            ErrorCode::DispatchExists => "Order already has a dispatch record",
            ErrorCode::DispatchInvalidStatus => "Invalid dispatch status value",
            ErrorCode::ManifestEmpty => "Delivery manifest is empty",
            ErrorCode::ManifestInvalidQuantity => "Delivery manifest has an invalid quantity",

            // Inventory
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductItemIdExists => "Product item_id already exists",
            ErrorCode::ProductMatchNone => "No product matches the given attributes",
            ErrorCode::ProductMatchAmbiguous => "More than one product matches the given attributes",
            ErrorCode::RawMaterialNotFound => "Raw material not found",
            ErrorCode::RawMaterialItemIdExists => "Raw material item_id already exists",

            // Production
            ErrorCode::BatchNotFound => "Production batch not found",
            ErrorCode::BatchInvalidStatus => "Invalid production status value",
            ErrorCode::InsufficientMaterials => "Insufficient raw material stock for batch",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::UserCannotDeleteSelf => "Cannot delete own account",
            ErrorCode::RoleInvalid => "Invalid role name",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::TransactionConflict => "Store transaction conflict, please retry",
            ErrorCode::AlertNotFound => "Alert not found",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::AdminRequired),
            2003 => Ok(ErrorCode::CannotModifyAdmin),
            2004 => Ok(ErrorCode::CannotDeleteAdmin),

            // Customer
            3001 => Ok(ErrorCode::CustomerNotFound),
            3002 => Ok(ErrorCode::CustomerEmailExists),
            3003 => Ok(ErrorCode::CustomerHasOrders),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderItemNotFound),
            4003 => Ok(ErrorCode::OrderEmpty),
            4004 => Ok(ErrorCode::OrderItemForeign),
            4005 => Ok(ErrorCode::OrderInvalidStatus),

            // Dispatch
            5001 => Ok(ErrorCode::DispatchNotFound),
            5002 => Ok(ErrorCode::DuplicateDispatchId),
            5003 => Ok(ErrorCode::DispatchExists),
            5004 => Ok(ErrorCode::DispatchInvalidStatus),
            5005 => Ok(ErrorCode::ManifestEmpty),
            5006 => Ok(ErrorCode::ManifestInvalidQuantity),

            // Inventory
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductItemIdExists),
            6003 => Ok(ErrorCode::ProductMatchNone),
            6004 => Ok(ErrorCode::ProductMatchAmbiguous),
            6101 => Ok(ErrorCode::RawMaterialNotFound),
            6102 => Ok(ErrorCode::RawMaterialItemIdExists),

            // Production
            7001 => Ok(ErrorCode::BatchNotFound),
            7002 => Ok(ErrorCode::BatchInvalidStatus),
            7003 => Ok(ErrorCode::InsufficientMaterials),

            // User
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8003 => Ok(ErrorCode::UserCannotDeleteSelf),
            8004 => Ok(ErrorCode::RoleInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::TimeoutError),
            9004 => Ok(ErrorCode::ConfigError),
            9005 => Ok(ErrorCode::TransactionConflict),
            9101 => Ok(ErrorCode::AlertNotFound),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::CustomerNotFound.code(), 3001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::DuplicateDispatchId.code(), 5002);
        assert_eq!(ErrorCode::ProductMatchAmbiguous.code(), 6004);
        assert_eq!(ErrorCode::BatchNotFound.code(), 7001);
        assert_eq!(ErrorCode::UsernameExists.code(), 8002);
        assert_eq!(ErrorCode::TransactionConflict.code(), 9005);
    }

    #[test]
    fn test_try_from_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::OrderNotFound,
            ErrorCode::ManifestEmpty,
            ErrorCode::ProductMatchNone,
            ErrorCode::InternalError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ErrorCode::OrderNotFound).unwrap(),
            "4001"
        );
        let code: ErrorCode = serde_json::from_str("5002").unwrap();
        assert_eq!(code, ErrorCode::DuplicateDispatchId);
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::DuplicateDispatchId.is_retryable());
        assert!(ErrorCode::TransactionConflict.is_retryable());
        assert!(!ErrorCode::OrderNotFound.is_retryable());
    }
}
