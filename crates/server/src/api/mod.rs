pub mod badge_controller;
pub mod event_controller;
pub mod leaderboard_controller;
pub mod profile_controller;

use axum::routing::{get, Router};

/// 系统健康检查
///
/// 返回服务器运行状态
#[utoipa::path(
    get,
    path = "/api/v1/",
    responses(
        (status = 200, description = "服务器运行正常", body = String)
    ),
    tag = "系统状态"
)]
pub async fn health() -> &'static str {
    "Server is running! 🚀"
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(health))
        .merge(profile_controller::ProfileController::app())
        .merge(badge_controller::BadgeController::app())
        .merge(leaderboard_controller::LeaderboardController::app())
        .merge(event_controller::EventController::app())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Services;
    use axum::Extension;
    use axum_test::TestServer;
    use database::Database;
    use std::sync::Arc;
    use utils::AppConfig;

    /// 构建测试路由。mongodb客户端惰性连接，参数校验类用例无需真实数据库
    async fn test_app() -> TestServer {
        std::env::set_var("MONGO_DB", "test_db_router");
        let config = Arc::new(AppConfig::new_for_test());
        let db = Database::new(config).await.unwrap();
        let services = Services::new(db);

        TestServer::new(app().layer(Extension(services))).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let server = test_app().await;

        let response = server.get("/").await;
        response.assert_status_ok();
        assert!(response.text().contains("Server is running"));
    }

    #[tokio::test]
    async fn test_leaderboard_rejects_out_of_range_limit() {
        let server = test_app().await;

        let response = server.get("/leaderboard?limit=0").await;
        response.assert_status_bad_request();

        let response = server.get("/leaderboard?limit=101").await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_leaderboard_rejects_unknown_time_window() {
        let server = test_app().await;

        let response = server.get("/leaderboard?time_window=YEARLY").await;
        response.assert_status_bad_request();
    }
}
