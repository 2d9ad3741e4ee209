//! HTTP security limits.

/// Maximum number of body bytes copied into [`HttpError::HttpStatus`](crate::HttpError::HttpStatus) previews.
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;
