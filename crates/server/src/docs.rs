use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Junx Rewards Backend API",
        description = "垃圾分类投递奖励系统后端：用户档案、徽章、榜单与投递事件 API 文档",
        version = "1.0.0",
        contact(
            name = "API Support",
            email = "support@junx.app"
        )
    ),
    paths(
        // System health check
        crate::api::health,
        // Profile endpoints
        crate::api::profile_controller::get_profile,
        crate::api::profile_controller::create_profile,
        crate::api::profile_controller::update_profile,
        // Badge endpoints
        crate::api::badge_controller::get_all_badges,
        crate::api::badge_controller::get_user_badges,
        // Leaderboard endpoints
        crate::api::leaderboard_controller::get_leaderboard,
        // Disposal event endpoints
        crate::api::event_controller::submit_event,
        crate::api::event_controller::review_event,
    ),
    components(
        schemas(
            // Database models
            database::profile::model::UserProfile,
            database::badge::model::BadgeType,
            database::badge::model::BadgeDefinition,
            database::badge::model::UserBadge,
            database::badge::model::UserBadgeWithDefinition,
            database::disposal_event::model::EventStatus,
            database::disposal_event::model::DisposalEvent,
            database::leaderboard::model::LeaderboardScope,
            database::leaderboard::model::TimeWindow,
            database::leaderboard::model::LeaderboardEntry,
            database::leaderboard::model::LeaderboardRow,
            // DTOs
            crate::dtos::profile_dto::CreateProfileDto,
            crate::dtos::profile_dto::UpdateProfileDto,
            crate::dtos::leaderboard_dto::LeaderboardQueryDto,
            crate::dtos::event_dto::SubmitEventDto,
            crate::dtos::event_dto::ReviewEventDto,
        )
    ),
    tags(
        (name = "系统状态", description = "健康检查"),
        (name = "profile", description = "用户档案的读取与部分更新"),
        (name = "badge", description = "徽章目录与用户徽章"),
        (name = "leaderboard", description = "GLOBAL榜单读取"),
        (name = "event", description = "投递事件的提交与审核")
    )
)]
pub struct ApiDoc;
