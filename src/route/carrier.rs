use std::sync::Arc;

use email_address::EmailAddress;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        access::AccessError,
        approval::{current_status, history, record_action},
        security::{get_user_from_token, BearerAuthorization},
        sqlx_utils::is_unique_violation,
        utils::{datetime_to_string, datetime_to_string_opt},
    },
    model::carrier_approval_history::ApprovalAction,
    repository::carrier::{create_carrier, get_carrier_by_id, paginate_carriers, update_carrier},
    schema::{
        carrier::{
            CarrierActionRequest, CarrierActionResponse, CarrierActionResponses,
            CarrierCreateRequest, CarrierCreateResponse, CarrierCreateResponses,
            CarrierDetailResponses, CarrierDetailSuccessResponse, CarrierHistoryResponses,
            CarrierHistoryRow, CarrierStatusResponse, CarrierStatusResponses,
            CarrierUpdateRequest, CarrierUpdateResponse, CarrierUpdateResponses,
            DetailCarrierPagination, PaginateCarrierResponses,
        },
        common::{
            BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
            PaginateResponse, UnauthorizedResponse,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiCarrierTags {
    Carrier,
}

pub struct ApiCarrier;

#[OpenApi]
impl ApiCarrier {
    #[oai(path = "/carrier/", method = "get", tag = "ApiCarrierTags::Carrier")]
    async fn paginate_carrier_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateCarrierResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PaginateCarrierResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "paginate_carrier_api",
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
                return PaginateCarrierResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "paginate_carrier_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return PaginateCarrierResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "paginate_carrier_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return PaginateCarrierResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_carriers(&mut tx, page, page_size, search).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateCarrierResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.carrier",
                            "paginate_carrier_api",
                            "paginate_carriers",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        let results = data
            .into_iter()
            .map(|item| DetailCarrierPagination {
                id: item.id.to_string(),
                name: item.name,
                mc_number: item.mc_number,
                dot_number: item.dot_number,
                contact_email: item.contact_email,
                contact_phone: item.contact_phone,
                created_at: datetime_to_string_opt(item.created_at),
                updated_at: datetime_to_string_opt(item.updated_at),
            })
            .collect();

        PaginateCarrierResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(
        path = "/carrier/detail/",
        method = "get",
        tag = "ApiCarrierTags::Carrier"
    )]
    async fn get_detail_carrier_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CarrierDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return CarrierDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "get_detail_carrier_api",
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
                return CarrierDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "get_detail_carrier_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return CarrierDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "get_detail_carrier_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return CarrierDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return CarrierDetailResponses::NotFound(Json(NotFoundResponse {
                    message: format!("carrier with id = {} not found", id),
                }))
            }
        };

        let data = match get_carrier_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return CarrierDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "get_detail_carrier_api",
                        "get_carrier_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if data.is_none() {
            return CarrierDetailResponses::NotFound(Json(NotFoundResponse {
                message: format!("carrier with id = {} not found", id),
            }));
        }
        let data = data.unwrap();

        // Current status derives from the newest history row
        let status = match current_status(&mut tx, &data.id).await {
            Ok(val) => val,
            Err(err) => {
                return CarrierDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "get_detail_carrier_api",
                        "current_status",
                        &err.to_string(),
                    ),
                ))
            }
        };

        CarrierDetailResponses::Ok(Json(CarrierDetailSuccessResponse {
            id: data.id.to_string(),
            name: data.name,
            mc_number: data.mc_number,
            dot_number: data.dot_number,
            contact_email: data.contact_email,
            contact_phone: data.contact_phone,
            status: status.map(|s| s.as_str().to_string()),
            created_at: datetime_to_string_opt(data.created_at),
            updated_at: datetime_to_string_opt(data.updated_at),
        }))
    }

    #[oai(path = "/carrier/", method = "post", tag = "ApiCarrierTags::Carrier")]
    async fn create_carrier_api(
        &self,
        Json(json): Json<CarrierCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CarrierCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return CarrierCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "create_carrier_api",
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
                return CarrierCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "create_carrier_api",
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
                    return CarrierCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.carrier",
                            "create_carrier_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return CarrierCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Validate before anything reaches storage
        if let Some(email) = &json.contact_email {
            if !EmailAddress::is_valid(email) {
                return CarrierCreateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("{} is not a valid email address", email),
                }));
            }
        }

        let new_carrier = match create_carrier(
            &mut tx,
            None,
            json.name,
            json.mc_number,
            json.dot_number,
            json.contact_email,
            json.contact_phone,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) if is_unique_violation(&err) => {
                return CarrierCreateResponses::Conflict(Json(ConflictResponse {
                    message: "carrier with this mc_number already exists".to_string(),
                }))
            }
            Err(err) => {
                return CarrierCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "create_carrier_api",
                        "create_carrier",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // The created row and its first history entry commit together
        if let Err(err) = record_action(
            &mut tx,
            &new_carrier.id,
            ApprovalAction::Created,
            Some(request_user.id),
            None,
            None,
            None,
        )
        .await
        {
            return CarrierCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.carrier",
                    "create_carrier_api",
                    "record_action",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return CarrierCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.carrier",
                    "create_carrier_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        CarrierCreateResponses::Ok(Json(CarrierCreateResponse {
            id: new_carrier.id.to_string(),
            name: new_carrier.name,
            mc_number: new_carrier.mc_number,
            status: ApprovalAction::Created.as_str().to_string(),
        }))
    }

    #[oai(path = "/carrier/", method = "put", tag = "ApiCarrierTags::Carrier")]
    async fn update_carrier_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<CarrierUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CarrierUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return CarrierUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "update_carrier_api",
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
                return CarrierUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "update_carrier_api",
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
                    return CarrierUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.carrier",
                            "update_carrier_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return CarrierUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        // Validate before anything reaches storage
        if let Some(email) = &json.contact_email {
            if !EmailAddress::is_valid(email) {
                return CarrierUpdateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("{} is not a valid email address", email),
                }));
            }
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return CarrierUpdateResponses::NotFound(Json(NotFoundResponse {
                    message: format!("carrier with id = {} not found", id),
                }))
            }
        };

        let data = match get_carrier_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return CarrierUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "update_carrier_api",
                        "get_carrier_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if data.is_none() {
            return CarrierUpdateResponses::NotFound(Json(NotFoundResponse {
                message: format!("carrier with id = {} not found", id),
            }));
        }
        let mut data = data.unwrap();

        if let Err(err) = update_carrier(
            &mut tx,
            &mut data,
            json.name,
            json.mc_number,
            json.dot_number,
            json.contact_email,
            json.contact_phone,
            None,
        )
        .await
        {
            return CarrierUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.carrier",
                    "update_carrier_api",
                    "update_carrier",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return CarrierUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.carrier",
                    "update_carrier_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        CarrierUpdateResponses::Ok(Json(CarrierUpdateResponse {
            id: data.id.to_string(),
            name: data.name,
            mc_number: data.mc_number,
        }))
    }

    /// Append one approval lifecycle action to the carrier's log.
    #[oai(
        path = "/carrier/approval-action/",
        method = "post",
        tag = "ApiCarrierTags::Carrier"
    )]
    async fn carrier_approval_action_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<CarrierActionRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CarrierActionResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return CarrierActionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_approval_action_api",
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
                return CarrierActionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_approval_action_api",
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
                    return CarrierActionResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.carrier",
                            "carrier_approval_action_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return CarrierActionResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let request_user = request_user.unwrap();

        // Reject unknown enum values before anything reaches storage
        let action = match ApprovalAction::parse(&json.action) {
            Some(val) => val,
            None => {
                return CarrierActionResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("{} is not a valid approval action", json.action),
                }))
            }
        };

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return CarrierActionResponses::NotFound(Json(NotFoundResponse {
                    message: format!("carrier with id = {} not found", id),
                }))
            }
        };

        let row = match record_action(
            &mut tx,
            &id,
            action,
            Some(request_user.id),
            json.notes,
            json.rejection_reason,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(AccessError::NotFound { entity, id }) => {
                return CarrierActionResponses::NotFound(Json(NotFoundResponse {
                    message: format!("{} with id = {} not found", entity, id),
                }))
            }
            Err(err) => {
                return CarrierActionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_approval_action_api",
                        "record_action",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = tx.commit().await {
            return CarrierActionResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.carrier",
                    "carrier_approval_action_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        CarrierActionResponses::Ok(Json(CarrierActionResponse {
            carrier_id: row.carrier_id.to_string(),
            action: row.action.as_str().to_string(),
            action_at: datetime_to_string(row.action_at),
        }))
    }

    #[oai(
        path = "/carrier/status/",
        method = "get",
        tag = "ApiCarrierTags::Carrier"
    )]
    async fn carrier_status_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CarrierStatusResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return CarrierStatusResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_status_api",
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
                return CarrierStatusResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_status_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return CarrierStatusResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_status_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return CarrierStatusResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return CarrierStatusResponses::NotFound(Json(NotFoundResponse {
                    message: format!("carrier with id = {} not found", id),
                }))
            }
        };

        let status = match current_status(&mut tx, &id).await {
            Ok(val) => val,
            Err(AccessError::NotFound { .. }) => {
                return CarrierStatusResponses::NotFound(Json(NotFoundResponse {
                    message: format!("carrier with id = {} not found", id),
                }))
            }
            Err(err) => {
                return CarrierStatusResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_status_api",
                        "current_status",
                        &err.to_string(),
                    ),
                ))
            }
        };

        CarrierStatusResponses::Ok(Json(CarrierStatusResponse {
            carrier_id: id.to_string(),
            status: status.map(|s| s.as_str().to_string()),
        }))
    }

    #[oai(
        path = "/carrier/history/",
        method = "get",
        tag = "ApiCarrierTags::Carrier"
    )]
    async fn carrier_history_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CarrierHistoryResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return CarrierHistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_history_api",
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
                return CarrierHistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_history_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return CarrierHistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_history_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return CarrierHistoryResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return CarrierHistoryResponses::NotFound(Json(NotFoundResponse {
                    message: format!("carrier with id = {} not found", id),
                }))
            }
        };

        let rows = match history(&mut tx, &id).await {
            Ok(val) => val,
            Err(AccessError::NotFound { .. }) => {
                return CarrierHistoryResponses::NotFound(Json(NotFoundResponse {
                    message: format!("carrier with id = {} not found", id),
                }))
            }
            Err(err) => {
                return CarrierHistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.carrier",
                        "carrier_history_api",
                        "history",
                        &err.to_string(),
                    ),
                ))
            }
        };

        CarrierHistoryResponses::Ok(Json(
            rows.into_iter()
                .map(|row| CarrierHistoryRow {
                    id: row.id.to_string(),
                    action: row.action.as_str().to_string(),
                    action_by_user_id: row.action_by_user_id.map(|x| x.to_string()),
                    action_at: datetime_to_string(row.action_at),
                    notes: row.notes,
                    rejection_reason: row.rejection_reason,
                })
                .collect(),
        ))
    }
}
