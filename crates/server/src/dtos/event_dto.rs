use database::disposal_event::model::EventStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Clone, Serialize, Deserialize, Debug, Validate, Default, ToSchema)]
pub struct SubmitEventDto {
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
    pub institution_id: Option<String>,
    /// 审核通过后记入的积分
    #[validate(required, range(min = 1))]
    pub points: Option<u64>,
    /// 投递发生时间戳，缺省为服务器当前时间
    pub occurred_at: Option<i64>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Validate, ToSchema)]
pub struct ReviewEventDto {
    #[validate(required, length(min = 1))]
    pub event_id: Option<String>,
    /// 审核结论：IN_REVIEW / VERIFIED / REJECTED
    pub status: EventStatus,
}
