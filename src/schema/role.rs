use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ConflictResponse, ForbiddenResponse, InternalServerErrorResponse,
    NotFoundResponse, PaginateResponse, UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct DetailRolePagination {
    pub id: String,
    pub name: String,
    pub guard_name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(ApiResponse)]
pub enum PaginateRoleResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<DetailRolePagination>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct RoleDropdownResponse {
    pub id: String,
    pub name: String,
}

#[derive(ApiResponse)]
pub enum RoleDropdownResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<RoleDropdownResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct RoleDetailSuccessResponse {
    pub id: String,
    pub name: String,
    pub guard_name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(ApiResponse)]
pub enum RoleDetailResponses {
    #[oai(status = 200)]
    Ok(Json<RoleDetailSuccessResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct RoleCreateRequest {
    pub name: String,
    pub description: Option<String>,
    /// Initial grant set; the role and every grant land in one
    /// transaction.
    pub permission_ids: Option<Vec<String>>,
}

#[derive(Object, Deserialize)]
pub struct RoleCreateResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
}

#[derive(ApiResponse)]
pub enum RoleCreateResponses {
    #[oai(status = 201)]
    Ok(Json<RoleCreateResponse>),

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
pub struct RoleUpdateRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Object, Deserialize)]
pub struct RoleUpdateResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
}

#[derive(ApiResponse)]
pub enum RoleUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<RoleUpdateResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum RoleDeleteResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 409)]
    Conflict(Json<ConflictResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
