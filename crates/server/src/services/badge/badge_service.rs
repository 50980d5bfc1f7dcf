use async_trait::async_trait;
use database::{
    badge::model::{BadgeDefinition, UserBadgeWithDefinition},
    Database,
};
use std::sync::Arc;
use utils::AppResult;

pub type DynBadgeService = Arc<dyn BadgeServiceTrait + Send + Sync>;

#[async_trait]
pub trait BadgeServiceTrait {
    // 徽章目录：只返回active=true的定义
    async fn get_all_badges(&self) -> AppResult<Vec<BadgeDefinition>>;

    // 用户已获得的徽章（联查定义），按earned_at倒序。
    // 未知用户视为"无可加载"，返回空列表
    async fn get_user_badges(&self, user_id: String) -> AppResult<Vec<UserBadgeWithDefinition>>;
}

#[derive(Clone)]
pub struct BadgeService {
    database: Arc<Database>,
}

impl BadgeService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl BadgeServiceTrait for BadgeService {
    async fn get_all_badges(&self) -> AppResult<Vec<BadgeDefinition>> {
        let definitions = self.database.badge_repository.get_active_definitions().await?;

        Ok(definitions)
    }

    async fn get_user_badges(&self, user_id: String) -> AppResult<Vec<UserBadgeWithDefinition>> {
        let badges = self.database.badge_repository.get_user_badges(&user_id).await?;

        Ok(badges)
    }
}
