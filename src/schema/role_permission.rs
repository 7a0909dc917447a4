use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    PaginateResponse, UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct DetailRoleRolePermission {
    pub id: String,
    pub name: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct DetailPermissionRolePermission {
    pub id: String,
    pub name: String,
    pub module: String,
    pub resource: String,
    pub action: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct DetailRolePermission {
    pub role: DetailRoleRolePermission,
    pub permission: DetailPermissionRolePermission,
}

#[derive(ApiResponse)]
pub enum PaginateRolePermissionResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<DetailRolePermission>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct RolePermissionCreateRequest {
    pub role_id: String,
    pub permission_id: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct RolePermissionCreateResponse {
    pub role_id: String,
    pub permission_id: String,
}

#[derive(ApiResponse)]
pub enum CreateRolePermissionResponses {
    #[oai(status = 201)]
    Ok(Json<RolePermissionCreateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 409)]
    Conflict(Json<ConflictResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum DeleteRolePermissionResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct UserPermissionResponse {
    pub id: String,
    pub name: String,
    #[oai(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub module: String,
    pub resource: String,
    pub action: String,
}

#[derive(ApiResponse)]
pub enum UserPermissionsResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<UserPermissionResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct AuthorizeResponse {
    pub authorized: bool,
}

/// Denied-but-known (`authorized: false`) is a 200; an unknown user id is
/// a 404. The two are different answers.
#[derive(ApiResponse)]
pub enum AuthorizeResponses {
    #[oai(status = 200)]
    Ok(Json<AuthorizeResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
