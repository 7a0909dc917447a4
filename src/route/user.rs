use std::sync::Arc;

use chrono::Local;
use email_address::EmailAddress;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, hash_password, BearerAuthorization},
        sqlx_utils::is_unique_violation,
        utils::datetime_to_string_opt,
    },
    model::user::User,
    repository::{
        role::get_role_by_id,
        user::{create_user, get_user_by_id, paginate_users, update_user},
    },
    schema::{
        common::{
            BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
            PaginateResponse, UnauthorizedResponse,
        },
        user::{
            DetailUserPagination, PaginateUserResponses, UserCreateRequest, UserCreateResponse,
            UserCreateResponses, UserDetailResponses, UserDetailRole, UserDetailSuccessResponse,
            UserUpdateRequest, UserUpdateResponse, UserUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiUserTags {
    User,
}

pub struct ApiUser;

#[OpenApi]
impl ApiUser {
    #[oai(path = "/user/", method = "get", tag = "ApiUserTags::User")]
    async fn paginate_user_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateUserResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PaginateUserResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "paginate_user_api",
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
                return PaginateUserResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "paginate_user_api",
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
                    return PaginateUserResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "paginate_user_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return PaginateUserResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_users(&mut tx, page, page_size, search).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateUserResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "paginate_user_api",
                            "paginate_users",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        let mut results: Vec<DetailUserPagination> = vec![];
        for item in data {
            let role = match get_role_by_id(&mut tx, &item.role_id).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateUserResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "paginate_user_api",
                            "get_role_by_id",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            results.push(DetailUserPagination {
                id: item.id.to_string(),
                user_name: item.user_name,
                email: item.email,
                role: role.map(|r| UserDetailRole {
                    id: r.id.to_string(),
                    name: r.name,
                }),
                is_active: item.is_active,
                created_at: datetime_to_string_opt(item.created_at),
                updated_at: datetime_to_string_opt(item.updated_at),
            });
        }

        PaginateUserResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/user/detail/", method = "get", tag = "ApiUserTags::User")]
    async fn get_detail_user_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
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
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
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
                    return UserDetailResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "get_detail_user_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return UserDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return UserDetailResponses::NotFound(Json(NotFoundResponse {
                    message: format!("user with id = {} not found", id),
                }))
            }
        };

        let data = match get_user_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
                        "get_user_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if data.is_none() {
            return UserDetailResponses::NotFound(Json(NotFoundResponse {
                message: format!("user with id = {} not found", id),
            }));
        }
        let data = data.unwrap();
        let role = match get_role_by_id(&mut tx, &data.role_id).await {
            Ok(val) => val,
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
                        "get_role_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        UserDetailResponses::Ok(Json(UserDetailSuccessResponse {
            id: data.id.to_string(),
            user_name: data.user_name,
            email: data.email,
            role: role.map(|r| UserDetailRole {
                id: r.id.to_string(),
                name: r.name,
            }),
            is_active: data.is_active,
            created_at: datetime_to_string_opt(data.created_at),
            updated_at: datetime_to_string_opt(data.updated_at),
        }))
    }

    #[oai(path = "/user/", method = "post", tag = "ApiUserTags::User")]
    async fn create_user_api(
        &self,
        Json(json): Json<UserCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
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
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
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
                    return UserCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "create_user_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return UserCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        // Validate before anything reaches storage
        if let Some(email) = &json.email {
            if !EmailAddress::is_valid(email) {
                return UserCreateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("{} is not a valid email address", email),
                }));
            }
        }
        let role_id = match Uuid::parse_str(&json.role_id) {
            Ok(val) => val,
            Err(_) => {
                return UserCreateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("role with id {} not found", json.role_id),
                }))
            }
        };
        let role = match get_role_by_id(&mut tx, &role_id).await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "get_role_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if role.is_none() {
            return UserCreateResponses::BadRequest(Json(BadRequestResponse {
                message: format!("role with id {} not found", json.role_id),
            }));
        }

        let hashed_password = match hash_password(&json.password) {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "hash password",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let now = Local::now().fixed_offset();
        let new_user = User {
            id: Uuid::now_v7(),
            user_name: json.user_name,
            email: json.email,
            password: hashed_password,
            role_id,
            is_active: true,
            created_at: Some(now),
            updated_at: Some(now),
        };
        match create_user(&mut tx, &new_user).await {
            Ok(()) => {}
            Err(err) if is_unique_violation(&err) => {
                return UserCreateResponses::Conflict(Json(ConflictResponse {
                    message: format!("user with user_name = {} already exists", new_user.user_name),
                }))
            }
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "create_user",
                        &err.to_string(),
                    ),
                ))
            }
        }
        if let Err(err) = tx.commit().await {
            return UserCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "create_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserCreateResponses::Ok(Json(UserCreateResponse {
            id: new_user.id.to_string(),
            user_name: new_user.user_name,
            email: new_user.email,
            role_id: new_user.role_id.to_string(),
            is_active: new_user.is_active,
        }))
    }

    #[oai(path = "/user/", method = "put", tag = "ApiUserTags::User")]
    async fn update_user_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<UserUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
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
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
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
                    return UserUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "update_user_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if request_user.is_none() {
            return UserUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        // Validate before anything reaches storage
        if let Some(email) = &json.email {
            if !EmailAddress::is_valid(email) {
                return UserUpdateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("{} is not a valid email address", email),
                }));
            }
        }
        let role_id = match Uuid::parse_str(&json.role_id) {
            Ok(val) => val,
            Err(_) => {
                return UserUpdateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("role with id {} not found", json.role_id),
                }))
            }
        };
        let role = match get_role_by_id(&mut tx, &role_id).await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "get_role_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if role.is_none() {
            return UserUpdateResponses::BadRequest(Json(BadRequestResponse {
                message: format!("role with id {} not found", json.role_id),
            }));
        }

        let id = match Uuid::parse_str(&id) {
            Ok(val) => val,
            Err(_) => {
                return UserUpdateResponses::NotFound(Json(NotFoundResponse {
                    message: format!("user with id = {} not found", id),
                }))
            }
        };

        let data = match get_user_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "get_user_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if data.is_none() {
            return UserUpdateResponses::NotFound(Json(NotFoundResponse {
                message: format!("user with id = {} not found", id),
            }));
        }
        let mut data = data.unwrap();

        if let Err(err) =
            update_user(&mut tx, &mut data, json.email, role_id, json.is_active, None).await
        {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "update_user_api",
                    "update_user",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "update_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserUpdateResponses::Ok(Json(UserUpdateResponse {
            id: data.id.to_string(),
            user_name: data.user_name,
            email: data.email,
            role_id: data.role_id.to_string(),
            is_active: data.is_active,
        }))
    }
}
