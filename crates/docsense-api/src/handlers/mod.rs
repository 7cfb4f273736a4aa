//! HTTP request handlers.

pub mod admin;
pub mod auth;
pub mod document;
pub mod health;
pub mod role;
pub mod user;

use validator::Validate;

use docsense_core::error::AppError;

use crate::error::ApiError;

/// Run DTO validation, flattening field errors into one message.
pub(crate) fn validate_dto(dto: &impl Validate) -> Result<(), ApiError> {
    dto.validate().map_err(|errors| {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for '{field}'"))
                })
            })
            .collect();
        ApiError(AppError::validation(messages.join("; ")))
    })
}
