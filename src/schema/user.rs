use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    PaginateResponse, UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct UserDetailRole {
    pub id: String,
    pub name: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct DetailUserPagination {
    pub id: String,
    pub user_name: String,
    pub email: Option<String>,
    pub role: Option<UserDetailRole>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(ApiResponse)]
pub enum PaginateUserResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<DetailUserPagination>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct UserDetailSuccessResponse {
    pub id: String,
    pub user_name: String,
    pub email: Option<String>,
    pub role: Option<UserDetailRole>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(ApiResponse)]
pub enum UserDetailResponses {
    #[oai(status = 200)]
    Ok(Json<UserDetailSuccessResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct UserCreateRequest {
    pub user_name: String,
    pub email: Option<String>,
    pub password: String,
    pub role_id: String,
}

#[derive(Object, Deserialize)]
pub struct UserCreateResponse {
    pub id: String,
    pub user_name: String,
    pub email: Option<String>,
    pub role_id: String,
    pub is_active: bool,
}

#[derive(ApiResponse)]
pub enum UserCreateResponses {
    #[oai(status = 201)]
    Ok(Json<UserCreateResponse>),

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
pub struct UserUpdateRequest {
    pub email: Option<String>,
    pub role_id: String,
    pub is_active: bool,
}

#[derive(Object, Deserialize)]
pub struct UserUpdateResponse {
    pub id: String,
    pub user_name: String,
    pub email: Option<String>,
    pub role_id: String,
    pub is_active: bool,
}

#[derive(ApiResponse)]
pub enum UserUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<UserUpdateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
