use crate::{
    dtos::event_dto::{ReviewEventDto, SubmitEventDto},
    extractors::validation_extractor::ValidationExtractor,
    services::Services,
};
use axum::{routing::post, Extension, Json, Router};
use database::disposal_event::model::DisposalEvent;
use utils::AppResult;

/// 提交投递事件
///
/// 初始状态SUBMITTED，审核通过后才计入余额与榜单
#[utoipa::path(
    post,
    path = "/api/v1/event",
    tag = "event",
    request_body = SubmitEventDto,
    responses(
        (status = 200, description = "成功记录投递事件", body = DisposalEvent),
        (status = 404, description = "提交用户不存在")
    )
)]
pub async fn submit_event(
    Extension(services): Extension<Services>,
    ValidationExtractor(req): ValidationExtractor<SubmitEventDto>,
) -> AppResult<Json<DisposalEvent>> {
    let event = services
        .event
        .submit_event(
            req.user_id.unwrap_or_default(),
            req.institution_id,
            req.points.unwrap_or_default(),
            req.occurred_at,
        )
        .await?;

    Ok(Json(event))
}

/// 审核投递事件
///
/// SUBMITTED → IN_REVIEW → VERIFIED | REJECTED，终态不可再迁移
#[utoipa::path(
    post,
    path = "/api/v1/event/review",
    tag = "event",
    request_body = ReviewEventDto,
    responses(
        (status = 200, description = "成功更新审核状态", body = DisposalEvent),
        (status = 400, description = "非法状态迁移"),
        (status = 404, description = "事件不存在")
    )
)]
pub async fn review_event(
    Extension(services): Extension<Services>,
    ValidationExtractor(req): ValidationExtractor<ReviewEventDto>,
) -> AppResult<Json<DisposalEvent>> {
    let event = services
        .event
        .review_event(req.event_id.unwrap_or_default(), req.status)
        .await?;

    Ok(Json(event))
}

pub struct EventController;
impl EventController {
    pub fn app() -> Router {
        Router::new()
            .route("/event", post(submit_event))
            .route("/event/review", post(review_event))
    }
}
