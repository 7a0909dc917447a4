use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        access::{
            delete_role_checked, grant_permissions_to_role, rename_role_checked, AccessError,
        },
        security::{get_user_from_token, BearerAuthorization},
        sqlx_utils::is_unique_violation,
        utils::datetime_to_string_opt,
    },
    repository::role::{create_role, get_dropdown_roles, get_role_by_id, paginate_roles},
    schema::{
        common::{
            BadRequestResponse, ConflictResponse, ForbiddenResponse, InternalServerErrorResponse,
            NotFoundResponse, PaginateResponse, UnauthorizedResponse,
        },
        role::{
            DetailRolePagination, PaginateRoleResponses, RoleCreateRequest, RoleCreateResponse,
            RoleCreateResponses, RoleDeleteResponses, RoleDetailResponses,
            RoleDetailSuccessResponse, RoleDropdownResponse, RoleDropdownResponses,
            RoleUpdateRequest, RoleUpdateResponse, RoleUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiRoleTags {
    Role,
}

pub struct ApiRole;

#[OpenApi]
impl ApiRole {
    #[oai(path = "/role/", method = "get", tag = "ApiRoleTags::Role")]
    async fn paginate_role_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateRoleResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PaginateRoleResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "paginate_role_api",
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
                return PaginateRoleResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "paginate_role_api",
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
                return PaginateRoleResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "paginate_role_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return PaginateRoleResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_roles(&mut tx, page, page_size, search).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateRoleResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "paginate_role_api",
                            "paginate_roles",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        let results = data
            .into_iter()
            .map(|item| DetailRolePagination {
                id: item.id.to_string(),
                name: item.name,
                guard_name: item.guard_name,
                description: item.description,
                is_system_role: item.is_system_role,
                created_at: datetime_to_string_opt(item.created_at),
                updated_at: datetime_to_string_opt(item.updated_at),
            })
            .collect();

        PaginateRoleResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/role/dropdown/", method = "get", tag = "ApiRoleTags::Role")]
    async fn get_dropdown_role_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleDropdownResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleDropdownResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_dropdown_role_api",
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
                return RoleDropdownResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_dropdown_role_api",
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
                return RoleDropdownResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_dropdown_role_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return RoleDropdownResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let data = match get_dropdown_roles(&mut tx, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDropdownResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_dropdown_role_api",
                        "get_dropdown_roles",
                        &err.to_string(),
                    ),
                ))
            }
        };

        RoleDropdownResponses::Ok(Json(
            data.iter()
                .map(|x| RoleDropdownResponse {
                    id: x.id.to_string(),
                    name: x.name.clone(),
                })
                .collect(),
        ))
    }

    #[oai(path = "/role/detail/", method = "get", tag = "ApiRoleTags::Role")]
    async fn get_detail_role_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
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
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
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
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return RoleDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return RoleDetailResponses::NotFound(Json(NotFoundResponse {
                    message: format!("role with id = {} not found", id),
                }))
            }
        };

        let data = match get_role_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
                        "get_role_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if data.is_none() {
            return RoleDetailResponses::NotFound(Json(NotFoundResponse {
                message: format!("role with id = {} not found", id),
            }));
        }
        let data = data.unwrap();
        RoleDetailResponses::Ok(Json(RoleDetailSuccessResponse {
            id: data.id.to_string(),
            name: data.name,
            guard_name: data.guard_name,
            description: data.description,
            is_system_role: data.is_system_role,
            created_at: datetime_to_string_opt(data.created_at),
            updated_at: datetime_to_string_opt(data.updated_at),
        }))
    }

    #[oai(path = "/role/", method = "post", tag = "ApiRoleTags::Role")]
    async fn create_role_api(
        &self,
        Json(json): Json<RoleCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
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
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
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
                    return RoleCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "create_role_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return RoleCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        // Validate the initial grant set before touching storage
        let mut permission_ids: Vec<Uuid> = vec![];
        for raw in json.permission_ids.unwrap_or_default() {
            match Uuid::parse_str(&raw) {
                Ok(val) => permission_ids.push(val),
                Err(_) => {
                    return RoleCreateResponses::BadRequest(Json(BadRequestResponse {
                        message: format!("permission with id {} not found", raw),
                    }))
                }
            }
        }

        let new_role = match create_role(
            &mut tx,
            None,
            json.name,
            None,
            json.description,
            false,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) if is_unique_violation(&err) => {
                return RoleCreateResponses::Conflict(Json(ConflictResponse {
                    message: "role with this name already exists".to_string(),
                }))
            }
            Err(err) => {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
                        "create_role",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Role and initial grants commit together or not at all
        if let Err(err) =
            grant_permissions_to_role(&mut tx, &new_role.id, &permission_ids, None).await
        {
            return match err {
                AccessError::NotFound { entity, id } => {
                    RoleCreateResponses::BadRequest(Json(BadRequestResponse {
                        message: format!("{} with id {} not found", entity, id),
                    }))
                }
                AccessError::Conflict(message) => {
                    RoleCreateResponses::Conflict(Json(ConflictResponse { message }))
                }
                err => RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
                        "grant_permissions_to_role",
                        &err.to_string(),
                    ),
                )),
            };
        }

        if let Err(err) = tx.commit().await {
            return RoleCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "create_role_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleCreateResponses::Ok(Json(RoleCreateResponse {
            id: new_role.id.to_string(),
            name: new_role.name,
            description: new_role.description,
            is_system_role: new_role.is_system_role,
        }))
    }

    #[oai(path = "/role/", method = "put", tag = "ApiRoleTags::Role")]
    async fn update_role_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<RoleUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
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
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
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
                    return RoleUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "update_role_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return RoleUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return RoleUpdateResponses::NotFound(Json(NotFoundResponse {
                    message: format!("role with id = {} not found", id),
                }))
            }
        };

        let data = match rename_role_checked(&mut tx, &id, json.name, json.description, None).await
        {
            Ok(val) => val,
            Err(AccessError::NotFound { .. }) => {
                return RoleUpdateResponses::NotFound(Json(NotFoundResponse {
                    message: format!("role with id = {} not found", id),
                }))
            }
            Err(AccessError::PolicyViolation(message)) => {
                return RoleUpdateResponses::Forbidden(Json(ForbiddenResponse { message }))
            }
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
                        "rename_role_checked",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = tx.commit().await {
            return RoleUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "update_role_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleUpdateResponses::Ok(Json(RoleUpdateResponse {
            id: data.id.to_string(),
            name: data.name,
            description: data.description,
            is_system_role: data.is_system_role,
        }))
    }

    #[oai(path = "/role/", method = "delete", tag = "ApiRoleTags::Role")]
    async fn delete_role_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
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
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
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
                    return RoleDeleteResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role",
                            "delete_role_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return RoleDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return RoleDeleteResponses::NotFound(Json(NotFoundResponse {
                    message: format!("role with id = {} not found", id),
                }))
            }
        };

        match delete_role_checked(&mut tx, &id).await {
            Ok(()) => {}
            Err(AccessError::NotFound { .. }) => {
                return RoleDeleteResponses::NotFound(Json(NotFoundResponse {
                    message: format!("role with id = {} not found", id),
                }))
            }
            Err(AccessError::PolicyViolation(message)) => {
                return RoleDeleteResponses::Forbidden(Json(ForbiddenResponse { message }))
            }
            Err(AccessError::Conflict(message)) => {
                return RoleDeleteResponses::Conflict(Json(ConflictResponse { message }))
            }
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
                        "delete_role_checked",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = tx.commit().await {
            return RoleDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "delete_role_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleDeleteResponses::NoContent
    }
}
