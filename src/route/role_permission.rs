use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        access::{grant_permission_to_role, is_authorized, resolve_effective_permissions, AccessError},
        security::{get_user_from_token, BearerAuthorization},
    },
    model::permission::PermissionAction,
    repository::{
        permission::get_permission_by_id,
        role::get_role_by_id,
        role_permission::{
            delete_role_permission, get_all_role_permissions, get_detail_role_permission,
        },
    },
    schema::{
        common::{
            BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
            PaginateResponse, UnauthorizedResponse,
        },
        role_permission::{
            AuthorizeResponse, AuthorizeResponses, CreateRolePermissionResponses,
            DeleteRolePermissionResponses, DetailPermissionRolePermission, DetailRolePermission,
            DetailRoleRolePermission, PaginateRolePermissionResponses,
            RolePermissionCreateRequest, RolePermissionCreateResponse, UserPermissionResponse,
            UserPermissionsResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiRolePermissionTags {
    RolePermission,
}

pub struct ApiRolePermission;

#[OpenApi]
impl ApiRolePermission {
    #[oai(
        path = "/role-permissions/",
        method = "get",
        tag = "ApiRolePermissionTags::RolePermission"
    )]
    async fn paginate_role_permission_api(
        &self,
        Query(role_id): Query<String>,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(all): Query<Option<bool>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateRolePermissionResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PaginateRolePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "paginate_role_permission_api",
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
                return PaginateRolePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "paginate_role_permission_api",
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
                    return PaginateRolePermissionResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role_permission",
                            "paginate_role_permission_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return PaginateRolePermissionResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }

        // Validate
        let role_id = match Uuid::parse_str(&role_id) {
            Ok(val) => val,
            Err(_) => {
                return PaginateRolePermissionResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("role with id = {} not found", role_id),
                }))
            }
        };
        let role = match get_role_by_id(&mut tx, &role_id).await {
            Ok(val) => val,
            Err(err) => {
                return PaginateRolePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "paginate_role_permission_api",
                        "get_role_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if role.is_none() {
            return PaginateRolePermissionResponses::BadRequest(Json(BadRequestResponse {
                message: format!("role with id = {} not found", role_id),
            }));
        }
        let role = role.unwrap();

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match get_all_role_permissions(&mut tx, Some(page), Some(page_size), &role_id, all)
                .await
            {
                Ok(val) => val,
                Err(err) => {
                    return PaginateRolePermissionResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role_permission",
                            "paginate_role_permission_api",
                            "get_all_role_permissions",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        let mut results: Vec<DetailRolePermission> = vec![];
        for item in data {
            let permission = match get_permission_by_id(&mut tx, &item.permission_id).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateRolePermissionResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role_permission",
                            "paginate_role_permission_api",
                            "get_permission_by_id",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if let Some(permission) = permission {
                results.push(DetailRolePermission {
                    role: DetailRoleRolePermission {
                        id: role.id.to_string(),
                        name: role.name.clone(),
                    },
                    permission: DetailPermissionRolePermission {
                        id: permission.id.to_string(),
                        name: permission.name,
                        module: permission.module,
                        resource: permission.resource,
                        action: permission.action.as_str().to_string(),
                    },
                });
            }
        }

        PaginateRolePermissionResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(
        path = "/role-permissions/",
        method = "post",
        tag = "ApiRolePermissionTags::RolePermission"
    )]
    async fn create_role_permission_api(
        &self,
        Json(json): Json<RolePermissionCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CreateRolePermissionResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return CreateRolePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "create_role_permission_api",
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
                return CreateRolePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "create_role_permission_api",
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
                    return CreateRolePermissionResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role_permission",
                            "create_role_permission_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return CreateRolePermissionResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }

        // Validate
        let role_id = match Uuid::parse_str(&json.role_id) {
            Ok(val) => val,
            Err(_) => {
                return CreateRolePermissionResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("role with id {} not found", json.role_id),
                }));
            }
        };
        let permission_id = match Uuid::parse_str(&json.permission_id) {
            Ok(val) => val,
            Err(_) => {
                return CreateRolePermissionResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("permission with id {} not found", json.permission_id),
                }));
            }
        };

        match grant_permission_to_role(&mut tx, &role_id, &permission_id, None).await {
            Ok(()) => {}
            Err(AccessError::NotFound { entity, id }) => {
                return CreateRolePermissionResponses::NotFound(Json(NotFoundResponse {
                    message: format!("{} with id {} not found", entity, id),
                }))
            }
            Err(AccessError::Conflict(message)) => {
                return CreateRolePermissionResponses::Conflict(Json(ConflictResponse { message }))
            }
            Err(err) => {
                return CreateRolePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "create_role_permission_api",
                        "grant_permission_to_role",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = tx.commit().await {
            return CreateRolePermissionResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_permission",
                    "create_role_permission_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        CreateRolePermissionResponses::Ok(Json(RolePermissionCreateResponse {
            role_id: role_id.to_string(),
            permission_id: permission_id.to_string(),
        }))
    }

    #[oai(
        path = "/role-permissions/",
        method = "delete",
        tag = "ApiRolePermissionTags::RolePermission"
    )]
    async fn delete_role_permission_api(
        &self,
        Query(role_id): Query<String>,
        Query(permission_id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DeleteRolePermissionResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DeleteRolePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "delete_role_permission_api",
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
                return DeleteRolePermissionResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "delete_role_permission_api",
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
                    return DeleteRolePermissionResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role_permission",
                            "delete_role_permission_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return DeleteRolePermissionResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        }

        // Validate
        let role_id = match Uuid::parse_str(&role_id) {
            Ok(val) => val,
            Err(_) => {
                return DeleteRolePermissionResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("role with id {} not found", role_id),
                }));
            }
        };
        let permission_id = match Uuid::parse_str(&permission_id) {
            Ok(val) => val,
            Err(_) => {
                return DeleteRolePermissionResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("permission with id {} not found", permission_id),
                }));
            }
        };

        let role_permission =
            match get_detail_role_permission(&mut tx, &role_id, &permission_id).await {
                Ok(val) => val,
                Err(err) => {
                    return DeleteRolePermissionResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role_permission",
                            "delete_role_permission_api",
                            "get_detail_role_permission",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if role_permission.is_none() {
            return DeleteRolePermissionResponses::NotFound(Json(NotFoundResponse {
                message: format!(
                    "role_permission with role_id = {}, permission_id = {} not found",
                    role_id, permission_id
                ),
            }));
        }
        let role_permission = role_permission.unwrap();

        if let Err(err) = delete_role_permission(&mut tx, &role_permission).await {
            return DeleteRolePermissionResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_permission",
                    "delete_role_permission_api",
                    "delete_role_permission",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return DeleteRolePermissionResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_permission",
                    "delete_role_permission_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        DeleteRolePermissionResponses::NoContent
    }

    /// The effective grant set of a user: everything reachable through
    /// their single role.
    #[oai(
        path = "/user-permissions/",
        method = "get",
        tag = "ApiRolePermissionTags::RolePermission"
    )]
    async fn get_user_permissions_api(
        &self,
        Query(user_id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserPermissionsResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserPermissionsResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "get_user_permissions_api",
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
                return UserPermissionsResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "get_user_permissions_api",
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
                    return UserPermissionsResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role_permission",
                            "get_user_permissions_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return UserPermissionsResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let user_id = match Uuid::parse_str(&user_id) {
            Ok(val) => val,
            Err(_) => {
                return UserPermissionsResponses::NotFound(Json(NotFoundResponse {
                    message: format!("user with id = {} not found", user_id),
                }))
            }
        };

        let permissions = match resolve_effective_permissions(&mut tx, &user_id).await {
            Ok(val) => val,
            Err(AccessError::NotFound { .. }) => {
                return UserPermissionsResponses::NotFound(Json(NotFoundResponse {
                    message: format!("user with id = {} not found", user_id),
                }))
            }
            Err(err) => {
                return UserPermissionsResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "get_user_permissions_api",
                        "resolve_effective_permissions",
                        &err.to_string(),
                    ),
                ))
            }
        };

        UserPermissionsResponses::Ok(Json(
            permissions
                .into_iter()
                .map(|p| UserPermissionResponse {
                    id: p.id.to_string(),
                    name: p.name,
                    kind: p.kind.as_str().to_string(),
                    module: p.module,
                    resource: p.resource,
                    action: p.action.as_str().to_string(),
                })
                .collect(),
        ))
    }

    /// Access check for one (module, resource, action) tuple. A missing
    /// grant answers `authorized: false`; a missing user is 404.
    #[oai(
        path = "/authorize/",
        method = "get",
        tag = "ApiRolePermissionTags::RolePermission"
    )]
    async fn authorize_api(
        &self,
        Query(user_id): Query<String>,
        Query(module): Query<String>,
        Query(resource): Query<String>,
        Query(action): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> AuthorizeResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return AuthorizeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "authorize_api",
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
                return AuthorizeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "authorize_api",
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
                    return AuthorizeResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.role_permission",
                            "authorize_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return AuthorizeResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        // Validate
        let action = match PermissionAction::parse(&action) {
            Some(val) => val,
            None => {
                return AuthorizeResponses::BadRequest(Json(BadRequestResponse {
                    message: format!(
                        "action must be one of view, create, update, delete; got {}",
                        action
                    ),
                }))
            }
        };
        let user_id = match Uuid::parse_str(&user_id) {
            Ok(val) => val,
            Err(_) => {
                return AuthorizeResponses::NotFound(Json(NotFoundResponse {
                    message: format!("user with id = {} not found", user_id),
                }))
            }
        };

        let authorized = match is_authorized(&mut tx, &user_id, &module, &resource, action).await {
            Ok(val) => val,
            Err(AccessError::NotFound { .. }) => {
                return AuthorizeResponses::NotFound(Json(NotFoundResponse {
                    message: format!("user with id = {} not found", user_id),
                }))
            }
            Err(err) => {
                return AuthorizeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_permission",
                        "authorize_api",
                        "is_authorized",
                        &err.to_string(),
                    ),
                ))
            }
        };

        AuthorizeResponses::Ok(Json(AuthorizeResponse { authorized }))
    }
}
