use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// `Json` extractor whose rejection is an [`AppError`] with a JSON body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path` extractor whose rejection is an [`AppError`] with a JSON body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
