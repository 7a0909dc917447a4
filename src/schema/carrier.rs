use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    PaginateResponse, UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct DetailCarrierPagination {
    pub id: String,
    pub name: String,
    pub mc_number: Option<String>,
    pub dot_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(ApiResponse)]
pub enum PaginateCarrierResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<DetailCarrierPagination>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct CarrierDetailSuccessResponse {
    pub id: String,
    pub name: String,
    pub mc_number: Option<String>,
    pub dot_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(ApiResponse)]
pub enum CarrierDetailResponses {
    #[oai(status = 200)]
    Ok(Json<CarrierDetailSuccessResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct CarrierCreateRequest {
    pub name: String,
    pub mc_number: Option<String>,
    pub dot_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Object, Deserialize)]
pub struct CarrierCreateResponse {
    pub id: String,
    pub name: String,
    pub mc_number: Option<String>,
    pub status: String,
}

#[derive(ApiResponse)]
pub enum CarrierCreateResponses {
    #[oai(status = 201)]
    Ok(Json<CarrierCreateResponse>),

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
pub struct CarrierUpdateRequest {
    pub name: String,
    pub mc_number: Option<String>,
    pub dot_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Object, Deserialize)]
pub struct CarrierUpdateResponse {
    pub id: String,
    pub name: String,
    pub mc_number: Option<String>,
}

#[derive(ApiResponse)]
pub enum CarrierUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<CarrierUpdateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct CarrierActionRequest {
    /// One of: created, manager_approved, accounts_approved, rejected,
    /// disabled, enabled.
    pub action: String,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct CarrierActionResponse {
    pub carrier_id: String,
    pub action: String,
    pub action_at: String,
}

#[derive(ApiResponse)]
pub enum CarrierActionResponses {
    #[oai(status = 201)]
    Ok(Json<CarrierActionResponse>),

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
pub struct CarrierStatusResponse {
    pub carrier_id: String,
    pub status: Option<String>,
}

#[derive(ApiResponse)]
pub enum CarrierStatusResponses {
    #[oai(status = 200)]
    Ok(Json<CarrierStatusResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct CarrierHistoryRow {
    pub id: String,
    pub action: String,
    pub action_by_user_id: Option<String>,
    pub action_at: String,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(ApiResponse)]
pub enum CarrierHistoryResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<CarrierHistoryRow>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
