use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, BearerAuthorization},
        sqlx_utils::is_unique_violation,
        utils::datetime_to_string_opt,
    },
    repository::{
        carrier::get_carrier_by_id,
        carrier_user_assignment::{
            create_assignment, delete_assignment, get_assignments_for_carrier,
            get_detail_assignment,
        },
        user::get_user_by_id,
    },
    schema::{
        carrier_assignment::{
            CarrierAssignmentCreateRequest, CarrierAssignmentCreateResponse,
            CreateCarrierAssignmentResponses, DeleteCarrierAssignmentResponses,
            DetailCarrierAssignment, ListCarrierAssignmentResponses,
        },
        common::{
            BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiCarrierAssignmentTags {
    CarrierAssignment,
}

pub struct ApiCarrierAssignment;

#[OpenApi]
impl ApiCarrierAssignment {
    /// Who is assigned to service a carrier.
    #[oai(
        path = "/carrier-assignments/",
        method = "get",
        tag = "ApiCarrierAssignmentTags::CarrierAssignment"
    )]
    async fn list_carrier_assignment_api(
        &self,
        Query(carrier_id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ListCarrierAssignmentResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ListCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "list_carrier_assignment_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return ListCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "list_carrier_assignment_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let request_user =
            match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
                Ok(val) => val,
                Err(err) => {
                    return ListCarrierAssignmentResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.carrier_assignment",
                            "list_carrier_assignment_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return ListCarrierAssignmentResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }

        // Validate
        let carrier_id = match Uuid::parse_str(&carrier_id) {
            Ok(val) => val,
            Err(_) => {
                return ListCarrierAssignmentResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("carrier with id = {} not found", carrier_id),
                }))
            }
        };
        let carrier = match get_carrier_by_id(&mut tx, &carrier_id).await {
            Ok(val) => val,
            Err(err) => {
                return ListCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "list_carrier_assignment_api",
                        "get_carrier_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if carrier.is_none() {
            return ListCarrierAssignmentResponses::NotFound(Json(NotFoundResponse {
                message: format!("carrier with id = {} not found", carrier_id),
            }));
        }

        let data = match get_assignments_for_carrier(&mut tx, &carrier_id).await {
            Ok(val) => val,
            Err(err) => {
                return ListCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "list_carrier_assignment_api",
                        "get_assignments_for_carrier",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let mut results: Vec<DetailCarrierAssignment> = vec![];
        for item in data {
            let user = match get_user_by_id(&mut tx, &item.user_id).await {
                Ok(val) => val,
                Err(err) => {
                    return ListCarrierAssignmentResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.carrier_assignment",
                            "list_carrier_assignment_api",
                            "get_user_by_id",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if let Some(user) = user {
                results.push(DetailCarrierAssignment {
                    id: item.id.to_string(),
                    carrier_id: item.carrier_id.to_string(),
                    user_id: item.user_id.to_string(),
                    user_name: user.user_name,
                    assigned_by: item.assigned_by.map(|x| x.to_string()),
                    assigned_at: datetime_to_string_opt(item.assigned_at),
                });
            }
        }

        ListCarrierAssignmentResponses::Ok(Json(results))
    }

    /// Assign a user to a carrier, attributed to the requesting user.
    #[oai(
        path = "/carrier-assignments/",
        method = "post",
        tag = "ApiCarrierAssignmentTags::CarrierAssignment"
    )]
    async fn create_carrier_assignment_api(
        &self,
        Json(json): Json<CarrierAssignmentCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CreateCarrierAssignmentResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return CreateCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "create_carrier_assignment_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return CreateCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "create_carrier_assignment_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let request_user =
            match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
                Ok(val) => val,
                Err(err) => {
                    return CreateCarrierAssignmentResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.carrier_assignment",
                            "create_carrier_assignment_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return CreateCarrierAssignmentResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }
        let request_user = request_user.unwrap();

        // Validate
        let carrier_id = match Uuid::parse_str(&json.carrier_id) {
            Ok(val) => val,
            Err(_) => {
                return CreateCarrierAssignmentResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("carrier with id {} not found", json.carrier_id),
                }));
            }
        };
        let carrier = match get_carrier_by_id(&mut tx, &carrier_id).await {
            Ok(val) => val,
            Err(err) => {
                return CreateCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "create_carrier_assignment_api",
                        "get_carrier_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if carrier.is_none() {
            return CreateCarrierAssignmentResponses::NotFound(Json(NotFoundResponse {
                message: format!("carrier with id {} not found", json.carrier_id),
            }));
        }

        let user_id = match Uuid::parse_str(&json.user_id) {
            Ok(val) => val,
            Err(_) => {
                return CreateCarrierAssignmentResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("user with id {} not found", json.user_id),
                }));
            }
        };
        let user = match get_user_by_id(&mut tx, &user_id).await {
            Ok(val) => val,
            Err(err) => {
                return CreateCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "create_carrier_assignment_api",
                        "get_user_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return CreateCarrierAssignmentResponses::NotFound(Json(NotFoundResponse {
                message: format!("user with id {} not found", json.user_id),
            }));
        }

        let existing = match get_detail_assignment(&mut tx, &carrier_id, &user_id).await {
            Ok(val) => val,
            Err(err) => {
                return CreateCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "create_carrier_assignment_api",
                        "get_detail_assignment",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if existing.is_some() {
            return CreateCarrierAssignmentResponses::Conflict(Json(ConflictResponse {
                message: format!(
                    "carrier_user_assignment with carrier_id = {}, user_id = {} already exists",
                    carrier_id, user_id
                ),
            }));
        }

        let new_assignment = match create_assignment(
            &mut tx,
            &carrier_id,
            &user_id,
            Some(request_user.id),
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) if is_unique_violation(&err) => {
                return CreateCarrierAssignmentResponses::Conflict(Json(ConflictResponse {
                    message: format!(
                        "carrier_user_assignment with carrier_id = {}, user_id = {} already exists",
                        carrier_id, user_id
                    ),
                }))
            }
            Err(err) => {
                return CreateCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "create_carrier_assignment_api",
                        "create_assignment",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = tx.commit().await {
            return CreateCarrierAssignmentResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.carrier_assignment",
                    "create_carrier_assignment_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        CreateCarrierAssignmentResponses::Ok(Json(CarrierAssignmentCreateResponse {
            id: new_assignment.id.to_string(),
            carrier_id: new_assignment.carrier_id.to_string(),
            user_id: new_assignment.user_id.to_string(),
            assigned_by: new_assignment.assigned_by.map(|x| x.to_string()),
        }))
    }

    #[oai(
        path = "/carrier-assignments/",
        method = "delete",
        tag = "ApiCarrierAssignmentTags::CarrierAssignment"
    )]
    async fn delete_carrier_assignment_api(
        &self,
        Query(carrier_id): Query<String>,
        Query(user_id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DeleteCarrierAssignmentResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DeleteCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "delete_carrier_assignment_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return DeleteCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "delete_carrier_assignment_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let request_user =
            match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
                Ok(val) => val,
                Err(err) => {
                    return DeleteCarrierAssignmentResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.carrier_assignment",
                            "delete_carrier_assignment_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return DeleteCarrierAssignmentResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }

        // Validate
        let carrier_id = match Uuid::parse_str(&carrier_id) {
            Ok(val) => val,
            Err(_) => {
                return DeleteCarrierAssignmentResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("carrier with id {} not found", carrier_id),
                }));
            }
        };
        let user_id = match Uuid::parse_str(&user_id) {
            Ok(val) => val,
            Err(_) => {
                return DeleteCarrierAssignmentResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("user with id {} not found", user_id),
                }));
            }
        };

        let assignment = match get_detail_assignment(&mut tx, &carrier_id, &user_id).await {
            Ok(val) => val,
            Err(err) => {
                return DeleteCarrierAssignmentResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier_assignment",
                        "delete_carrier_assignment_api",
                        "get_detail_assignment",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if assignment.is_none() {
            return DeleteCarrierAssignmentResponses::NotFound(Json(NotFoundResponse {
                message: format!(
                    "carrier_user_assignment with carrier_id = {}, user_id = {} not found",
                    carrier_id, user_id
                ),
            }));
        }
        let assignment = assignment.unwrap();

        if let Err(err) = delete_assignment(&mut tx, &assignment).await {
            return DeleteCarrierAssignmentResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.carrier_assignment",
                    "delete_carrier_assignment_api",
                    "delete_assignment",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return DeleteCarrierAssignmentResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.carrier_assignment",
                    "delete_carrier_assignment_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        DeleteCarrierAssignmentResponses::NoContent
    }
}
