use anyhow::Result;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::FindOptions,
    Collection, IndexModel,
};
use tracing::{error, info};
use utils::{AppError, AppResult};

use super::model::{BadgeDefinition, UserBadge, UserBadgeWithDefinition};

/// 徽章仓库：目录(BadgeDefinition) + 发放台账(UserBadge)
#[derive(Clone, Debug)]
pub struct BadgeRepository {
    definitions: Collection<BadgeDefinition>,
    awards: Collection<UserBadge>,
}

impl BadgeRepository {
    pub fn new(definitions: Collection<BadgeDefinition>, awards: Collection<UserBadge>) -> Self {
        Self { definitions, awards }
    }

    /// 初始化数据库索引
    pub async fn init_indexes(&self) -> Result<()> {
        let definition_indexes = vec![
            // 徽章标识唯一索引
            IndexModel::builder()
                .keys(doc! { "badge_id": 1 })
                .options(
                    mongodb::options::IndexOptions::builder()
                        .unique(true)
                        .name("badge_id_unique".to_string())
                        .build(),
                )
                .build(),
            // 目录查询只取active=true
            IndexModel::builder()
                .keys(doc! { "active": 1 })
                .options(mongodb::options::IndexOptions::builder().name("active".to_string()).build())
                .build(),
        ];

        let award_indexes = vec![
            // 用户徽章列表按earned_at倒序返回
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "earned_at": -1 })
                .options(
                    mongodb::options::IndexOptions::builder()
                        .name("user_earned_desc".to_string())
                        .build(),
                )
                .build(),
        ];

        match self.definitions.create_indexes(definition_indexes, None).await {
            Ok(_) => {}
            Err(e) => {
                error!("❌ 徽章定义索引创建失败: {}", e);
                return Err(e.into());
            }
        }
        match self.awards.create_indexes(award_indexes, None).await {
            Ok(_) => {}
            Err(e) => {
                error!("❌ 徽章台账索引创建失败: {}", e);
                return Err(e.into());
            }
        }

        info!("✅ 徽章集合索引初始化完成");
        Ok(())
    }

    /// 录入一个徽章定义（badge_id重复则冲突）
    pub async fn create_definition(&self, mut definition: BadgeDefinition) -> AppResult<BadgeDefinition> {
        let existing = self
            .definitions
            .find_one(doc! { "badge_id": &definition.badge_id }, None)
            .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Badge definition {} already exists.",
                definition.badge_id
            )));
        }

        let inserted = self.definitions.insert_one(&definition, None).await?;
        definition.id = inserted.inserted_id.as_object_id();

        Ok(definition)
    }

    /// 目录查询：只返回active=true的定义
    pub async fn get_active_definitions(&self) -> AppResult<Vec<BadgeDefinition>> {
        let options = FindOptions::builder().sort(doc! { "created_at": 1 }).build();
        let cursor = self.definitions.find(doc! { "active": true }, options).await?;
        let definitions = cursor.try_collect().await?;

        Ok(definitions)
    }

    /// 追加一条发放记录。台账只追加：没有更新/删除入口
    pub async fn award_badge(
        &self,
        user_id: &str,
        badge_id: &str,
        earned_at: i64,
        metadata: Document,
    ) -> AppResult<UserBadge> {
        let mut award = UserBadge {
            id: None,
            user_id: user_id.to_string(),
            badge_id: badge_id.to_string(),
            earned_at,
            metadata,
        };

        let inserted = self.awards.insert_one(&award, None).await?;
        award.id = inserted.inserted_id.as_object_id();

        Ok(award)
    }

    /// 用户徽章列表：联查徽章定义，按earned_at倒序。
    /// 已停用(active=false)的定义对用户不可见，联查时一并过滤。
    pub async fn get_user_badges(&self, user_id: &str) -> AppResult<Vec<UserBadgeWithDefinition>> {
        let pipeline = vec![
            doc! { "$match": { "user_id": user_id } },
            doc! {
                "$lookup": {
                    // 联查目标取集合实际名称，测试环境使用带后缀的集合
                    "from": self.definitions.name(),
                    "localField": "badge_id",
                    "foreignField": "badge_id",
                    "as": "badge"
                }
            },
            doc! { "$unwind": "$badge" },
            doc! { "$match": { "badge.active": true } },
            doc! { "$sort": { "earned_at": -1, "_id": -1 } },
        ];

        let mut cursor = self.awards.aggregate(pipeline, None).await?;
        let mut badges = Vec::new();

        while let Some(document) = cursor.try_next().await? {
            match mongodb::bson::from_document::<UserBadgeWithDefinition>(document) {
                Ok(badge) => badges.push(badge),
                Err(e) => {
                    error!("❌ 反序列化用户徽章失败: {}", e);
                }
            }
        }

        Ok(badges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::model::BadgeType;
    use mongodb::options::ClientOptions;

    /// 创建测试用的数据库连接（每个测试使用独立集合）
    async fn setup_test_repo(suffix: &str) -> BadgeRepository {
        let mongo_uri = std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client_options = ClientOptions::parse(&mongo_uri).await.unwrap();
        let client = mongodb::Client::with_options(client_options).unwrap();
        let db = client.database("test_db_badges");

        let definitions = db.collection::<BadgeDefinition>(&format!("BadgeDefinition_{}", suffix));
        let awards = db.collection::<UserBadge>(&format!("UserBadge_{}", suffix));
        definitions.drop(None).await.ok();
        awards.drop(None).await.ok();

        BadgeRepository::new(definitions, awards)
    }

    fn definition(badge_id: &str, active: bool) -> BadgeDefinition {
        BadgeDefinition {
            id: None,
            badge_id: badge_id.to_string(),
            name: format!("badge {}", badge_id),
            description: None,
            icon_url: None,
            badge_type: BadgeType::Lifetime,
            threshold_config: doc! { "events": 10 },
            active,
            created_at: 1700000000,
        }
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_catalog_returns_only_active_definitions() {
        let repo = setup_test_repo("catalog").await;

        repo.create_definition(definition("b1", true)).await.unwrap();
        repo.create_definition(definition("b2", false)).await.unwrap();
        repo.create_definition(definition("b3", true)).await.unwrap();

        let catalog = repo.get_active_definitions().await.unwrap();
        let ids: Vec<&str> = catalog.iter().map(|d| d.badge_id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b3"]);
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_duplicate_definition_is_rejected() {
        let repo = setup_test_repo("dup").await;

        repo.create_definition(definition("b1", true)).await.unwrap();
        let result = repo.create_definition(definition("b1", true)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_user_badges_sorted_by_earned_at_desc() {
        let repo = setup_test_repo("sorted").await;

        repo.create_definition(definition("b1", true)).await.unwrap();
        repo.create_definition(definition("b2", true)).await.unwrap();
        repo.create_definition(definition("hidden", false)).await.unwrap();

        repo.award_badge("u1", "b1", 1700000100, doc! {}).await.unwrap();
        repo.award_badge("u1", "b2", 1700000300, doc! {}).await.unwrap();
        repo.award_badge("u1", "b1", 1700000200, doc! {}).await.unwrap();
        // 停用定义的发放记录不应出现
        repo.award_badge("u1", "hidden", 1700000400, doc! {}).await.unwrap();
        // 其他用户的记录不应出现
        repo.award_badge("u2", "b1", 1700000500, doc! {}).await.unwrap();

        let badges = repo.get_user_badges("u1").await.unwrap();
        let earned: Vec<i64> = badges.iter().map(|b| b.award.earned_at).collect();
        assert_eq!(earned, vec![1700000300, 1700000200, 1700000100]);

        // 无发放记录时返回空列表而不是错误
        let none = repo.get_user_badges("nobody").await.unwrap();
        assert!(none.is_empty());

        // 幂等：无新增发放时两次查询结果一致
        let again = repo.get_user_badges("u1").await.unwrap();
        let earned_again: Vec<i64> = again.iter().map(|b| b.award.earned_at).collect();
        assert_eq!(earned, earned_again);
    }
}
