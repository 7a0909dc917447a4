use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};

#[derive(Object, Deserialize, Serialize)]
pub struct DetailCarrierAssignment {
    pub id: String,
    pub carrier_id: String,
    pub user_id: String,
    pub user_name: String,
    pub assigned_by: Option<String>,
    pub assigned_at: Option<String>,
}

#[derive(ApiResponse)]
pub enum ListCarrierAssignmentResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<DetailCarrierAssignment>>),

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
pub struct CarrierAssignmentCreateRequest {
    pub carrier_id: String,
    pub user_id: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct CarrierAssignmentCreateResponse {
    pub id: String,
    pub carrier_id: String,
    pub user_id: String,
    pub assigned_by: Option<String>,
}

#[derive(ApiResponse)]
pub enum CreateCarrierAssignmentResponses {
    #[oai(status = 201)]
    Ok(Json<CarrierAssignmentCreateResponse>),

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
pub enum DeleteCarrierAssignmentResponses {
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
