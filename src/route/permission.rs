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
    model::permission::{PermissionAction, PermissionKind},
    repository::permission::{
        create_permission, delete_permission, get_dropdown_permissions, get_permission_by_id,
        paginate_permissions, update_permission,
    },
    schema::{
        common::{
            BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
            PaginateResponse, UnauthorizedResponse,
        },
        permission::{
            DetailPermissionPagination, PaginatePermissionResponses, PermissionCreateRequest,
            PermissionCreateResponse, PermissionCreateResponses, PermissionDeleteResponses,
            PermissionDetailResponses, PermissionDetailSuccessResponse, PermissionDropdownResponse,
            PermissionDropdownResponses, PermissionUpdateRequest, PermissionUpdateResponse,
            PermissionUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiPermissionTags {
    Permission,
}

pub struct ApiPermission;

#[OpenApi]
impl ApiPermission {
    #[oai(
        path = "/permission/",
        method = "get",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn paginate_permission_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(module): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginatePermissionResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PaginatePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "paginate_permission_api",
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
                return PaginatePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "paginate_permission_api",
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
                return PaginatePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "paginate_permission_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return PaginatePermissionResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_permissions(&mut tx, page, page_size, search, module).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginatePermissionResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.permission",
                            "paginate_permission_api",
                            "paginate_permissions",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        let results = data
            .into_iter()
            .map(|item| DetailPermissionPagination {
                id: item.id.to_string(),
                name: item.name,
                kind: item.kind.as_str().to_string(),
                module: item.module,
                resource: item.resource,
                action: item.action.as_str().to_string(),
                description: item.description,
                created_at: datetime_to_string_opt(item.created_at),
                updated_at: datetime_to_string_opt(item.updated_at),
            })
            .collect();

        PaginatePermissionResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(
        path = "/permission/dropdown/",
        method = "get",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn get_dropdown_permission_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionDropdownResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionDropdownResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_dropdown_permission_api",
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
                return PermissionDropdownResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_dropdown_permission_api",
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
                return PermissionDropdownResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_dropdown_permission_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return PermissionDropdownResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }

        let data = match get_dropdown_permissions(&mut tx, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return PermissionDropdownResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_dropdown_permission_api",
                        "get_dropdown_permissions",
                        &err.to_string(),
                    ),
                ))
            }
        };

        PermissionDropdownResponses::Ok(Json(
            data.iter()
                .map(|x| PermissionDropdownResponse {
                    id: x.id.to_string(),
                    name: x.name.clone(),
                })
                .collect(),
        ))
    }

    #[oai(
        path = "/permission/detail/",
        method = "get",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn get_detail_permission_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_detail_permission_api",
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
                return PermissionDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_detail_permission_api",
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
                return PermissionDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_detail_permission_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return PermissionDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return PermissionDetailResponses::NotFound(Json(NotFoundResponse {
                    message: format!("permission with id = {} not found", id),
                }))
            }
        };

        let data = match get_permission_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return PermissionDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_detail_permission_api",
                        "get_permission_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if data.is_none() {
            return PermissionDetailResponses::NotFound(Json(NotFoundResponse {
                message: format!("permission with id = {} not found", id),
            }));
        }
        let data = data.unwrap();
        PermissionDetailResponses::Ok(Json(PermissionDetailSuccessResponse {
            id: data.id.to_string(),
            name: data.name,
            kind: data.kind.as_str().to_string(),
            module: data.module,
            resource: data.resource,
            action: data.action.as_str().to_string(),
            description: data.description,
            created_at: datetime_to_string_opt(data.created_at),
            updated_at: datetime_to_string_opt(data.updated_at),
        }))
    }

    #[oai(
        path = "/permission/",
        method = "post",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn create_permission_api(
        &self,
        Json(json): Json<PermissionCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "create_permission_api",
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
                return PermissionCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "create_permission_api",
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
                    return PermissionCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.permission",
                            "create_permission_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return PermissionCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        // Reject unknown enum values before anything reaches storage
        let kind = match PermissionKind::parse(&json.kind) {
            Some(val) => val,
            None => {
                return PermissionCreateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!(
                        "type must be one of feature, route, column; got {}",
                        json.kind
                    ),
                }))
            }
        };
        let action = match PermissionAction::parse(&json.action) {
            Some(val) => val,
            None => {
                return PermissionCreateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!(
                        "action must be one of view, create, update, delete; got {}",
                        json.action
                    ),
                }))
            }
        };

        let new_permission = match create_permission(
            &mut tx,
            None,
            json.name,
            kind,
            json.module,
            json.resource,
            action,
            json.description,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) if is_unique_violation(&err) => {
                return PermissionCreateResponses::Conflict(Json(ConflictResponse {
                    message: "permission with this name already exists".to_string(),
                }))
            }
            Err(err) => {
                return PermissionCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "create_permission_api",
                        "create_permission",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return PermissionCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "create_permission_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PermissionCreateResponses::Ok(Json(PermissionCreateResponse {
            id: new_permission.id.to_string(),
            name: new_permission.name,
            kind: new_permission.kind.as_str().to_string(),
            module: new_permission.module,
            resource: new_permission.resource,
            action: new_permission.action.as_str().to_string(),
        }))
    }

    #[oai(
        path = "/permission/",
        method = "put",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn update_permission_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<PermissionUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "update_permission_api",
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
                return PermissionUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "update_permission_api",
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
                    return PermissionUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.permission",
                            "update_permission_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return PermissionUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let kind = match PermissionKind::parse(&json.kind) {
            Some(val) => val,
            None => {
                return PermissionUpdateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!(
                        "type must be one of feature, route, column; got {}",
                        json.kind
                    ),
                }))
            }
        };
        let action = match PermissionAction::parse(&json.action) {
            Some(val) => val,
            None => {
                return PermissionUpdateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!(
                        "action must be one of view, create, update, delete; got {}",
                        json.action
                    ),
                }))
            }
        };

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return PermissionUpdateResponses::NotFound(Json(NotFoundResponse {
                    message: format!("permission with id = {} not found", id),
                }))
            }
        };

        let data = match get_permission_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return PermissionUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "update_permission_api",
                        "get_permission_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if data.is_none() {
            return PermissionUpdateResponses::NotFound(Json(NotFoundResponse {
                message: format!("permission with id = {} not found", id),
            }));
        }
        let mut data = data.unwrap();

        if let Err(err) = update_permission(
            &mut tx,
            &mut data,
            json.name,
            kind,
            json.module,
            json.resource,
            action,
            json.description,
            None,
        )
        .await
        {
            return PermissionUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "update_permission_api",
                    "update_permission",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return PermissionUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "update_permission_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PermissionUpdateResponses::Ok(Json(PermissionUpdateResponse {
            id: data.id.to_string(),
            name: data.name,
            kind: data.kind.as_str().to_string(),
            module: data.module,
            resource: data.resource,
            action: data.action.as_str().to_string(),
        }))
    }

    #[oai(
        path = "/permission/",
        method = "delete",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn delete_permission_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "delete_permission_api",
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
                return PermissionDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "delete_permission_api",
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
                    return PermissionDeleteResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.permission",
                            "delete_permission_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return PermissionDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return PermissionDeleteResponses::NotFound(Json(NotFoundResponse {
                    message: format!("permission with id = {} not found", id),
                }))
            }
        };

        let data = match get_permission_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return PermissionDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "delete_permission_api",
                        "get_permission_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if data.is_none() {
            return PermissionDeleteResponses::NotFound(Json(NotFoundResponse {
                message: format!("permission with id = {} not found", id),
            }));
        }
        let data = data.unwrap();

        if let Err(err) = delete_permission(&mut tx, &data).await {
            return PermissionDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "delete_permission_api",
                    "delete_permission",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return PermissionDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "delete_permission_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PermissionDeleteResponses::NoContent
    }
}
