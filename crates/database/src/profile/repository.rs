use crate::{
    profile::model::{ProfileUpdate, UserProfile},
    Database,
};
use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, Bson},
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use std::sync::Arc;
use utils::{AppError, AppResult};

pub type DynProfileRepository = Arc<dyn ProfileRepositoryTrait + Send + Sync>;

// 主要用于Service中，表示提供了该Trait功能
#[async_trait]
pub trait ProfileRepositoryTrait {
    // 创建档案(账户创建钩子，一个user_id只允许一行)
    async fn create_profile(
        &self,
        user_id: &str,
        username: &str,
        device_id: Option<String>,
    ) -> AppResult<UserProfile>;

    async fn get_profile(&self, user_id: &str) -> AppResult<Option<UserProfile>>;

    // 部分字段更新：只改动给出的字段，其余保持原值
    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> AppResult<UserProfile>;

    // 余额入账(投递事件审核通过时调用)
    async fn credit_balance(&self, user_id: &str, amount: f64) -> AppResult<()>;

    // 总榜排名回写：榜上用户写rank，落榜用户清rank
    async fn write_back_ranks(&self, ranked: &[(String, u32)]) -> AppResult<()>;
}

#[async_trait]
impl ProfileRepositoryTrait for Database {
    async fn create_profile(
        &self,
        user_id: &str,
        username: &str,
        device_id: Option<String>,
    ) -> AppResult<UserProfile> {
        let existing = self.user_profiles.find_one(doc! { "user_id": user_id }, None).await?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Profile with user_id: {} already exists.",
                user_id
            )));
        }

        let mut new_doc = UserProfile::new(
            user_id.to_string(),
            username.to_string(),
            device_id,
            Utc::now().timestamp(),
        );

        let inserted = self.user_profiles.insert_one(&new_doc, None).await?;
        new_doc.id = inserted.inserted_id.as_object_id();

        Ok(new_doc)
    }

    async fn get_profile(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        let filter = doc! { "user_id": user_id };
        let profile = self.user_profiles.find_one(filter, None).await?;

        Ok(profile)
    }

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> AppResult<UserProfile> {
        if update.is_empty() {
            return Err(AppError::BadRequest("No fields to update.".to_string()));
        }

        let set = update.into_set_document(Utc::now().timestamp());
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .user_profiles
            .find_one_and_update(doc! { "user_id": user_id }, doc! { "$set": set }, options)
            .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Profile with user_id {} not found.", user_id)))
    }

    async fn credit_balance(&self, user_id: &str, amount: f64) -> AppResult<()> {
        let result = self
            .user_profiles
            .update_one(
                doc! { "user_id": user_id },
                doc! {
                    "$inc": { "junx_balance": amount },
                    "$set": { "updated_at": Utc::now().timestamp() },
                },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Profile with user_id {} not found.",
                user_id
            )));
        }

        Ok(())
    }

    async fn write_back_ranks(&self, ranked: &[(String, u32)]) -> AppResult<()> {
        let now = Utc::now().timestamp();

        for (user_id, rank) in ranked {
            self.user_profiles
                .update_one(
                    doc! { "user_id": user_id },
                    doc! { "$set": { "rank": *rank, "updated_at": now } },
                    None,
                )
                .await?;
        }

        // 不在榜上的用户清掉缓存的排名
        let on_board: Vec<Bson> = ranked.iter().map(|(user_id, _)| Bson::from(user_id.clone())).collect();
        self.user_profiles
            .update_many(
                doc! { "user_id": { "$nin": on_board }, "rank": { "$exists": true } },
                doc! { "$unset": { "rank": "" }, "$set": { "updated_at": now } },
                None,
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils::AppConfig;

    /// 创建测试用的数据库连接（独立库，避免污染业务数据）
    async fn setup_test_db() -> Database {
        std::env::set_var("MONGO_DB", "test_db_profile");
        let config = Arc::new(AppConfig::new_for_test());
        let db = Database::new(config).await.unwrap();
        db.user_profiles.drop(None).await.ok();
        db
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_create_and_get_profile() {
        let db = setup_test_db().await;

        let created = db.create_profile("u1", "alice", None).await.unwrap();
        assert_eq!(created.user_id, "u1");
        assert_eq!(created.junx_balance, 0.0);
        assert!(!created.privacy_consent);

        // 读是幂等的：两次读取结果一致
        let first = db.get_profile("u1").await.unwrap().expect("profile should exist");
        let second = db.get_profile("u1").await.unwrap().expect("profile should exist");
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.username, second.username);
        assert_eq!(first.updated_at, second.updated_at);

        // 重复创建冲突
        let duplicate = db.create_profile("u1", "alice2", None).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_partial_update_leaves_other_fields_untouched() {
        let db = setup_test_db().await;

        db.create_profile("u1", "alice", Some("device-1".to_string())).await.unwrap();
        let before = db.get_profile("u1").await.unwrap().unwrap();

        let updated = db
            .update_profile(
                "u1",
                ProfileUpdate {
                    privacy_consent: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // 只有consent和updated_at发生变化
        assert!(updated.privacy_consent);
        assert_eq!(updated.username, before.username);
        assert_eq!(updated.junx_balance, before.junx_balance);
        assert_eq!(updated.device_id, before.device_id);
        assert_eq!(updated.created_at, before.created_at);

        let reread = db.get_profile("u1").await.unwrap().unwrap();
        assert!(reread.privacy_consent);
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_update_missing_profile_is_rejected() {
        let db = setup_test_db().await;

        let result = db
            .update_profile(
                "ghost",
                ProfileUpdate {
                    username: Some("nobody".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_rank_write_back() {
        let db = setup_test_db().await;

        db.create_profile("u1", "alice", None).await.unwrap();
        db.create_profile("u2", "bob", None).await.unwrap();
        db.create_profile("u3", "carol", None).await.unwrap();

        db.write_back_ranks(&[("u1".to_string(), 1), ("u2".to_string(), 2)])
            .await
            .unwrap();

        assert_eq!(db.get_profile("u1").await.unwrap().unwrap().rank, Some(1));
        assert_eq!(db.get_profile("u2").await.unwrap().unwrap().rank, Some(2));
        assert_eq!(db.get_profile("u3").await.unwrap().unwrap().rank, None);

        // u2落榜后排名被清除
        db.write_back_ranks(&[("u1".to_string(), 1)]).await.unwrap();
        assert_eq!(db.get_profile("u2").await.unwrap().unwrap().rank, None);
    }
}
