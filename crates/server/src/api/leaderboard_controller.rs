use crate::{dtos::leaderboard_dto::LeaderboardQueryDto, services::Services};
use axum::{extract::Query, routing::get, Extension, Json, Router};
use database::leaderboard::model::LeaderboardRow;
use utils::AppResult;
use validator::Validate;

/// 查询GLOBAL榜单
///
/// 返回最新快照的前limit行，按rank升序，联查用户名。
/// 尚未发布过快照的窗口返回空列表
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQueryDto),
    responses(
        (status = 200, description = "成功返回榜单", body = Vec<LeaderboardRow>),
        (status = 400, description = "查询参数非法")
    )
)]
pub async fn get_leaderboard(
    Extension(services): Extension<Services>,
    Query(query): Query<LeaderboardQueryDto>,
) -> AppResult<Json<Vec<LeaderboardRow>>> {
    query.validate()?;

    let rows = services
        .leaderboard
        .get_leaderboard(query.time_window(), query.limit())
        .await?;

    Ok(Json(rows))
}

pub struct LeaderboardController;
impl LeaderboardController {
    pub fn app() -> Router {
        Router::new().route("/leaderboard", get(get_leaderboard))
    }
}
