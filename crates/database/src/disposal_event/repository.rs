use anyhow::Result;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Collection, IndexModel,
};
use tracing::{error, info};
use utils::{AppError, AppResult};

use super::model::{DisposalEvent, EventStatus, WindowScore};

/// 投递事件仓库
#[derive(Clone, Debug)]
pub struct DisposalEventRepository {
    collection: Collection<DisposalEvent>,
}

impl DisposalEventRepository {
    pub fn new(collection: Collection<DisposalEvent>) -> Self {
        Self { collection }
    }

    /// 初始化数据库索引
    pub async fn init_indexes(&self) -> Result<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "user_id": 1 })
                .options(mongodb::options::IndexOptions::builder().name("user_id".to_string()).build())
                .build(),
            // 窗口聚合按(status, occurred_at)过滤
            IndexModel::builder()
                .keys(doc! { "status": 1, "occurred_at": 1 })
                .options(
                    mongodb::options::IndexOptions::builder()
                        .name("status_occurred".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "institution_id": 1 })
                .options(
                    mongodb::options::IndexOptions::builder()
                        .name("institution_id".to_string())
                        .build(),
                )
                .build(),
        ];

        match self.collection.create_indexes(indexes, None).await {
            Ok(_) => {
                info!("✅ 投递事件索引初始化完成");
                Ok(())
            }
            Err(e) => {
                error!("❌ 投递事件索引创建失败: {}", e);
                Err(e.into())
            }
        }
    }

    /// 记录一笔新提交的投递事件
    pub async fn submit(
        &self,
        user_id: &str,
        institution_id: Option<String>,
        points: u64,
        occurred_at: i64,
        created_at: i64,
    ) -> AppResult<DisposalEvent> {
        let mut event = DisposalEvent {
            id: None,
            user_id: user_id.to_string(),
            institution_id,
            points,
            status: EventStatus::Submitted,
            occurred_at,
            reviewed_at: None,
            created_at,
        };

        let inserted = self.collection.insert_one(&event, None).await?;
        event.id = inserted.inserted_id.as_object_id();

        Ok(event)
    }

    pub async fn get(&self, id: &ObjectId) -> AppResult<Option<DisposalEvent>> {
        let event = self.collection.find_one(doc! { "_id": id }, None).await?;

        Ok(event)
    }

    /// 更新审核状态。状态机校验由Service层完成，这里只做落库
    pub async fn update_status(
        &self,
        id: &ObjectId,
        status: EventStatus,
        reviewed_at: i64,
    ) -> AppResult<DisposalEvent> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str(), "reviewed_at": reviewed_at } },
                options,
            )
            .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Disposal event {} not found.", id)))
    }

    /// 窗口积分聚合：统计[start, end)内VERIFIED事件，按用户汇总。
    ///
    /// 返回每个用户的 score=Σpoints 与 reached_at=max(occurred_at)。
    /// 窗口内没有任何合格事件时返回空列表而不是错误。
    pub async fn aggregate_window_scores(
        &self,
        institution_id: Option<&str>,
        start: i64,
        end: i64,
    ) -> AppResult<Vec<WindowScore>> {
        let mut filter = doc! {
            "status": EventStatus::Verified.as_str(),
            "occurred_at": { "$gte": start, "$lt": end },
        };
        if let Some(institution_id) = institution_id {
            filter.insert("institution_id", institution_id);
        }

        let pipeline = vec![
            doc! { "$match": filter },
            doc! {
                "$group": {
                    "_id": "$user_id",
                    "score": { "$sum": "$points" },
                    "reached_at": { "$max": "$occurred_at" }
                }
            },
        ];

        let mut cursor = self.collection.aggregate(pipeline, None).await?;
        let mut scores = Vec::new();

        while let Some(document) = cursor.try_next().await? {
            let user_id = document.get_str("_id").unwrap_or_default().to_string();
            if user_id.is_empty() {
                continue;
            }
            // MongoDB可能返回Int32或Int64，需要兼容处理
            let score = read_int(&document, "score").unwrap_or(0).max(0) as u64;
            let reached_at = read_int(&document, "reached_at").unwrap_or(0);

            scores.push(WindowScore {
                user_id,
                score,
                reached_at,
            });
        }

        Ok(scores)
    }

    /// 出现过VERIFIED事件的机构列表（用于逐机构重算分榜）
    pub async fn distinct_verified_institutions(&self) -> AppResult<Vec<String>> {
        let filter = doc! {
            "status": EventStatus::Verified.as_str(),
            "institution_id": { "$ne": Bson::Null },
        };

        let values = self.collection.distinct("institution_id", filter, None).await?;
        let institutions = values
            .into_iter()
            .filter_map(|value| value.as_str().map(|s| s.to_string()))
            .collect();

        Ok(institutions)
    }
}

fn read_int(document: &Document, key: &str) -> Option<i64> {
    document
        .get_i64(key)
        .or_else(|_| document.get_i32(key).map(|v| v as i64))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::options::ClientOptions;

    /// 创建测试用的数据库连接（每个测试使用独立集合）
    async fn setup_test_repo(suffix: &str) -> DisposalEventRepository {
        let mongo_uri = std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client_options = ClientOptions::parse(&mongo_uri).await.unwrap();
        let client = mongodb::Client::with_options(client_options).unwrap();
        let db = client.database("test_db_events");
        let collection = db.collection::<DisposalEvent>(&format!("DisposalEvent_{}", suffix));
        collection.drop(None).await.ok();

        DisposalEventRepository::new(collection)
    }

    async fn submit_verified(
        repo: &DisposalEventRepository,
        user_id: &str,
        institution_id: Option<&str>,
        points: u64,
        occurred_at: i64,
    ) {
        let event = repo
            .submit(user_id, institution_id.map(|s| s.to_string()), points, occurred_at, occurred_at)
            .await
            .unwrap();
        repo.update_status(&event.id.unwrap(), EventStatus::Verified, occurred_at)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_window_scores_only_count_verified_events_in_range() {
        let repo = setup_test_repo("window").await;

        submit_verified(&repo, "u1", None, 100, 1000).await;
        submit_verified(&repo, "u1", None, 50, 2000).await;
        submit_verified(&repo, "u2", None, 80, 1500).await;

        // 窗口之外
        submit_verified(&repo, "u1", None, 999, 5000).await;
        // 未审核通过的不计分
        repo.submit("u2", None, 999, 1600, 1600).await.unwrap();

        let mut scores = repo.aggregate_window_scores(None, 1000, 3000).await.unwrap();
        scores.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        assert_eq!(
            scores,
            vec![
                WindowScore {
                    user_id: "u1".to_string(),
                    score: 150,
                    reached_at: 2000
                },
                WindowScore {
                    user_id: "u2".to_string(),
                    score: 80,
                    reached_at: 1500
                },
            ]
        );
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_empty_window_returns_empty_list() {
        let repo = setup_test_repo("empty").await;

        submit_verified(&repo, "u1", None, 100, 1000).await;

        let scores = repo.aggregate_window_scores(None, 2000, 3000).await.unwrap();
        assert!(scores.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_institution_filter_and_distinct() {
        let repo = setup_test_repo("institution").await;

        submit_verified(&repo, "u1", Some("school-a"), 100, 1000).await;
        submit_verified(&repo, "u2", Some("school-b"), 200, 1000).await;
        submit_verified(&repo, "u3", None, 300, 1000).await;

        let scores = repo.aggregate_window_scores(Some("school-a"), 0, 2000).await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].user_id, "u1");

        let mut institutions = repo.distinct_verified_institutions().await.unwrap();
        institutions.sort();
        assert_eq!(institutions, vec!["school-a".to_string(), "school-b".to_string()]);
    }
}
