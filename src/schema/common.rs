use poem_openapi::{
    types::{ParseFromJSON, ToJSON},
    Object,
};
use serde::Deserialize;

#[derive(Object)]
pub struct PaginateResponse<T: ParseFromJSON + ToJSON + Send + Sync> {
    pub counts: u32,
    pub page: u32,
    pub page_count: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

#[derive(Object, Deserialize)]
pub struct BadRequestResponse {
    pub message: String,
}

#[derive(Object, Deserialize)]
pub struct UnauthorizedResponse {
    pub message: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            message: "Invalid or expired token".to_string(),
        }
    }
}

#[derive(Object, Deserialize)]
pub struct ForbiddenResponse {
    pub message: String,
}

#[derive(Object, Deserialize)]
pub struct NotFoundResponse {
    pub message: String,
}

#[derive(Object, Deserialize)]
pub struct ConflictResponse {
    pub message: String,
}

#[derive(Object, Deserialize)]
pub struct InternalServerErrorResponse {
    pub module: String,
    pub function: String,
    pub step: String,
    pub error: String,
}

impl InternalServerErrorResponse {
    pub fn new(module: &str, function: &str, step: &str, error: &str) -> Self {
        Self {
            module: module.to_string(),
            function: function.to_string(),
            step: step.to_string(),
            error: error.to_string(),
        }
    }
}
