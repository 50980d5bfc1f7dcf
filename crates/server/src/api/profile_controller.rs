use crate::{
    dtos::profile_dto::{CreateProfileDto, UpdateProfileDto},
    extractors::validation_extractor::ValidationExtractor,
    services::Services,
};
use axum::{
    extract::Path,
    routing::{get, post},
    Extension, Json, Router,
};
use database::profile::model::UserProfile;
use utils::{AppError, AppResult};

/// 查询用户档案
#[utoipa::path(
    get,
    path = "/api/v1/profile/{user_id}",
    tag = "profile",
    params(
        ("user_id" = String, Path, description = "用户标识")
    ),
    responses(
        (status = 200, description = "成功返回用户档案", body = UserProfile),
        (status = 404, description = "档案不存在")
    )
)]
pub async fn get_profile(
    Extension(services): Extension<Services>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    match services.profile.get_profile(user_id.to_string()).await? {
        Some(profile) => Ok(Json(profile)),
        None => Err(AppError::NotFound(format!(
            "Profile with user_id {} not found.",
            user_id
        ))),
    }
}

/// 创建用户档案（账户创建钩子）
#[utoipa::path(
    post,
    path = "/api/v1/profile",
    tag = "profile",
    request_body = CreateProfileDto,
    responses(
        (status = 200, description = "成功创建档案", body = UserProfile),
        (status = 409, description = "user_id已存在")
    )
)]
pub async fn create_profile(
    Extension(services): Extension<Services>,
    ValidationExtractor(req): ValidationExtractor<CreateProfileDto>,
) -> AppResult<Json<UserProfile>> {
    let profile = services
        .profile
        .create_profile(
            req.user_id.unwrap_or_default(),
            req.username.unwrap_or_default(),
            req.device_id,
        )
        .await?;

    Ok(Json(profile))
}

/// 部分更新用户档案
///
/// 只改动请求体中给出的字段，其余字段保持原值
#[utoipa::path(
    patch,
    path = "/api/v1/profile/{user_id}",
    tag = "profile",
    params(
        ("user_id" = String, Path, description = "用户标识")
    ),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "成功返回更新后的档案", body = UserProfile),
        (status = 404, description = "档案不存在")
    )
)]
pub async fn update_profile(
    Extension(services): Extension<Services>,
    Path(user_id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<UpdateProfileDto>,
) -> AppResult<Json<UserProfile>> {
    let profile = services.profile.update_profile(user_id, req.into()).await?;

    Ok(Json(profile))
}

pub struct ProfileController;
impl ProfileController {
    pub fn app() -> Router {
        Router::new()
            .route("/profile", post(create_profile))
            .route("/profile/:user_id", get(get_profile).patch(update_profile))
    }
}
