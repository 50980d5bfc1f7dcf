use crate::services::Services;
use axum::{extract::Path, routing::get, Extension, Json, Router};
use database::badge::model::{BadgeDefinition, UserBadgeWithDefinition};
use utils::AppResult;

/// 徽章目录
///
/// 只返回active=true的徽章定义
#[utoipa::path(
    get,
    path = "/api/v1/badges",
    tag = "badge",
    responses(
        (status = 200, description = "成功返回徽章目录", body = Vec<BadgeDefinition>)
    )
)]
pub async fn get_all_badges(Extension(services): Extension<Services>) -> AppResult<Json<Vec<BadgeDefinition>>> {
    let definitions = services.badge.get_all_badges().await?;

    Ok(Json(definitions))
}

/// 用户已获得的徽章
///
/// 联查徽章定义，按earned_at倒序。未知用户返回空列表
#[utoipa::path(
    get,
    path = "/api/v1/badges/user/{user_id}",
    tag = "badge",
    params(
        ("user_id" = String, Path, description = "用户标识")
    ),
    responses(
        (status = 200, description = "成功返回用户徽章列表", body = Vec<UserBadgeWithDefinition>)
    )
)]
pub async fn get_user_badges(
    Extension(services): Extension<Services>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<UserBadgeWithDefinition>>> {
    let badges = services.badge.get_user_badges(user_id).await?;

    Ok(Json(badges))
}

pub struct BadgeController;
impl BadgeController {
    pub fn app() -> Router {
        Router::new()
            .route("/badges", get(get_all_badges))
            .route("/badges/user/:user_id", get(get_user_badges))
    }
}
