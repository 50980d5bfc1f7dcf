use async_trait::async_trait;
use database::profile::{
    model::{ProfileUpdate, UserProfile},
    repository::DynProfileRepository,
};
use std::sync::Arc;
use utils::AppResult;

pub type DynProfileService = Arc<dyn ProfileServiceTrait + Send + Sync>;

#[async_trait]
pub trait ProfileServiceTrait {
    async fn get_profile(&self, user_id: String) -> AppResult<Option<UserProfile>>;

    async fn create_profile(
        &self,
        user_id: String,
        username: String,
        device_id: Option<String>,
    ) -> AppResult<UserProfile>;

    // 部分字段更新：未给出的字段保持原值
    async fn update_profile(&self, user_id: String, update: ProfileUpdate) -> AppResult<UserProfile>;
}

#[derive(Clone)]
pub struct ProfileService {
    repository: DynProfileRepository,
}

impl ProfileService {
    pub fn new(repository: DynProfileRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ProfileServiceTrait for ProfileService {
    async fn get_profile(&self, user_id: String) -> AppResult<Option<UserProfile>> {
        let profile = self.repository.get_profile(&user_id).await?;

        Ok(profile)
    }

    async fn create_profile(
        &self,
        user_id: String,
        username: String,
        device_id: Option<String>,
    ) -> AppResult<UserProfile> {
        let profile = self.repository.create_profile(&user_id, &username, device_id).await?;

        Ok(profile)
    }

    async fn update_profile(&self, user_id: String, update: ProfileUpdate) -> AppResult<UserProfile> {
        let profile = self.repository.update_profile(&user_id, update).await?;

        Ok(profile)
    }
}
