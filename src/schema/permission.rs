use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    PaginateResponse, UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct DetailPermissionPagination {
    pub id: String,
    pub name: String,
    #[oai(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub module: String,
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(ApiResponse)]
pub enum PaginatePermissionResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<DetailPermissionPagination>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct PermissionDropdownResponse {
    pub id: String,
    pub name: String,
}

#[derive(ApiResponse)]
pub enum PermissionDropdownResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<PermissionDropdownResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct PermissionDetailSuccessResponse {
    pub id: String,
    pub name: String,
    #[oai(rename = "type")]
    pub kind: String,
    pub module: String,
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(ApiResponse)]
pub enum PermissionDetailResponses {
    #[oai(status = 200)]
    Ok(Json<PermissionDetailSuccessResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct PermissionCreateRequest {
    pub name: String,
    #[oai(rename = "type")]
    pub kind: String,
    pub module: String,
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
}

#[derive(Object, Deserialize)]
pub struct PermissionCreateResponse {
    pub id: String,
    pub name: String,
    #[oai(rename = "type")]
    pub kind: String,
    pub module: String,
    pub resource: String,
    pub action: String,
}

#[derive(ApiResponse)]
pub enum PermissionCreateResponses {
    #[oai(status = 201)]
    Ok(Json<PermissionCreateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 409)]
    Conflict(Json<ConflictResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct PermissionUpdateRequest {
    pub name: String,
    #[oai(rename = "type")]
    pub kind: String,
    pub module: String,
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
}

#[derive(Object, Deserialize)]
pub struct PermissionUpdateResponse {
    pub id: String,
    pub name: String,
    #[oai(rename = "type")]
    pub kind: String,
    pub module: String,
    pub resource: String,
    pub action: String,
}

#[derive(ApiResponse)]
pub enum PermissionUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<PermissionUpdateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum PermissionDeleteResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
