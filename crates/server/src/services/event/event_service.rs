use async_trait::async_trait;
use chrono::Utc;
use database::{
    disposal_event::model::{DisposalEvent, EventStatus},
    Database, ProfileRepositoryTrait,
};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::info;
use utils::{AppError, AppResult};

pub type DynDisposalEventService = Arc<dyn DisposalEventServiceTrait + Send + Sync>;

#[async_trait]
pub trait DisposalEventServiceTrait {
    // 提交一笔投递事件（初始状态SUBMITTED）
    async fn submit_event(
        &self,
        user_id: String,
        institution_id: Option<String>,
        points: u64,
        occurred_at: Option<i64>,
    ) -> AppResult<DisposalEvent>;

    // 审核状态迁移。VERIFIED时将积分入账到用户余额
    async fn review_event(&self, event_id: String, status: EventStatus) -> AppResult<DisposalEvent>;
}

#[derive(Clone)]
pub struct DisposalEventService {
    database: Arc<Database>,
}

impl DisposalEventService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl DisposalEventServiceTrait for DisposalEventService {
    async fn submit_event(
        &self,
        user_id: String,
        institution_id: Option<String>,
        points: u64,
        occurred_at: Option<i64>,
    ) -> AppResult<DisposalEvent> {
        // 未知用户的提交直接拒绝
        if self.database.get_profile(&user_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Profile with user_id {} not found.",
                user_id
            )));
        }

        let now = Utc::now().timestamp();
        let event = self
            .database
            .disposal_event_repository
            .submit(&user_id, institution_id, points, occurred_at.unwrap_or(now), now)
            .await?;

        Ok(event)
    }

    async fn review_event(&self, event_id: String, status: EventStatus) -> AppResult<DisposalEvent> {
        let object_id = ObjectId::parse_str(&event_id)
            .map_err(|_| AppError::BadRequest(format!("Invalid event id: {}", event_id)))?;

        let event = self
            .database
            .disposal_event_repository
            .get(&object_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Disposal event {} not found.", event_id)))?;

        if !event.status.can_transition_to(status) {
            return Err(AppError::BadRequest(format!(
                "Illegal status transition: {} -> {}",
                event.status.as_str(),
                status.as_str()
            )));
        }

        let updated = self
            .database
            .disposal_event_repository
            .update_status(&object_id, status, Utc::now().timestamp())
            .await?;

        // 审核通过即入账。状态机保证终态只进一次，不会重复入账
        if status == EventStatus::Verified {
            self.database.credit_balance(&updated.user_id, updated.points as f64).await?;
            info!(
                "💰 积分入账: user={}, points={}, event={}",
                updated.user_id, updated.points, event_id
            );
        }

        Ok(updated)
    }
}
