use anyhow::Result;
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::UpdateOptions,
    Collection, IndexModel,
};
use tracing::{error, info};
use utils::AppResult;
use uuid::Uuid;

use super::model::{LeaderboardEntry, LeaderboardRow, LeaderboardScope, LeaderboardSnapshot, RankedScore, TimeWindow};

/// 榜单缓存仓库：快照行 + 每分区一个的快照指针
///
/// 发布流程：先插入带新snapshot_id的全部行，再单文档原子更新指针，最后清理旧行。
/// 读取方先解析指针再按snapshot_id过滤，因此永远不会读到新旧混杂的分区。
#[derive(Clone, Debug)]
pub struct LeaderboardRepository {
    entries: Collection<LeaderboardEntry>,
    snapshots: Collection<LeaderboardSnapshot>,
}

impl LeaderboardRepository {
    pub fn new(entries: Collection<LeaderboardEntry>, snapshots: Collection<LeaderboardSnapshot>) -> Self {
        Self { entries, snapshots }
    }

    /// 初始化数据库索引
    pub async fn init_indexes(&self) -> Result<()> {
        let entry_indexes = vec![
            // 读路径：按快照过滤后按rank升序
            IndexModel::builder()
                .keys(doc! { "snapshot_id": 1, "rank": 1 })
                .options(
                    mongodb::options::IndexOptions::builder()
                        .name("snapshot_rank".to_string())
                        .build(),
                )
                .build(),
            // 清理路径：按分区定位旧行
            IndexModel::builder()
                .keys(doc! { "scope": 1, "time_window": 1, "institution_id": 1 })
                .options(
                    mongodb::options::IndexOptions::builder()
                        .name("partition".to_string())
                        .build(),
                )
                .build(),
        ];

        let snapshot_indexes = vec![
            // 每个分区只允许一个指针文档
            IndexModel::builder()
                .keys(doc! { "scope": 1, "time_window": 1, "institution_id": 1 })
                .options(
                    mongodb::options::IndexOptions::builder()
                        .unique(true)
                        .name("partition_unique".to_string())
                        .build(),
                )
                .build(),
        ];

        match self.entries.create_indexes(entry_indexes, None).await {
            Ok(_) => {}
            Err(e) => {
                error!("❌ 榜单行索引创建失败: {}", e);
                return Err(e.into());
            }
        }
        match self.snapshots.create_indexes(snapshot_indexes, None).await {
            Ok(_) => {}
            Err(e) => {
                error!("❌ 榜单快照索引创建失败: {}", e);
                return Err(e.into());
            }
        }

        info!("✅ 榜单集合索引初始化完成");
        Ok(())
    }

    fn partition_filter(scope: LeaderboardScope, window: TimeWindow, institution_id: Option<&str>) -> Document {
        doc! {
            "scope": scope.as_str(),
            "time_window": window.as_str(),
            "institution_id": institution_id.map(Bson::from).unwrap_or(Bson::Null),
        }
    }

    /// 整体替换一个分区的快照，返回新快照ID。
    ///
    /// 指针翻转是单文档更新，天然原子；空榜也照常发布（指针指向空快照）。
    pub async fn publish(
        &self,
        scope: LeaderboardScope,
        window: TimeWindow,
        institution_id: Option<&str>,
        period_start: i64,
        period_end: i64,
        ranked: &[RankedScore],
    ) -> AppResult<String> {
        let snapshot_id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        // 1. 插入新快照的全部行。此时指针仍指向旧快照，读取方不受影响
        if !ranked.is_empty() {
            let rows: Vec<LeaderboardEntry> = ranked
                .iter()
                .map(|ranked_score| LeaderboardEntry {
                    id: None,
                    user_id: ranked_score.user_id.clone(),
                    scope,
                    time_window: window,
                    rank: ranked_score.rank,
                    score: ranked_score.score,
                    institution_id: institution_id.map(|s| s.to_string()),
                    period_start,
                    period_end,
                    updated_at: now,
                    snapshot_id: snapshot_id.clone(),
                })
                .collect();

            self.entries.insert_many(rows, None).await?;
        }

        // 2. 原子翻转指针
        let options = UpdateOptions::builder().upsert(true).build();
        self.snapshots
            .update_one(
                Self::partition_filter(scope, window, institution_id),
                doc! {
                    "$set": {
                        "snapshot_id": &snapshot_id,
                        "period_start": period_start,
                        "period_end": period_end,
                        "published_at": now,
                    }
                },
                options,
            )
            .await?;

        // 3. 清理被替换下来的旧行
        let mut prune = Self::partition_filter(scope, window, institution_id);
        prune.insert("snapshot_id", doc! { "$ne": &snapshot_id });
        self.entries.delete_many(prune, None).await?;

        info!(
            "📋 榜单快照已发布: scope={}, window={}, institution={:?}, 共{}行",
            scope.as_str(),
            window.as_str(),
            institution_id,
            ranked.len()
        );

        Ok(snapshot_id)
    }

    /// 当前生效的快照指针
    pub async fn current_snapshot(
        &self,
        scope: LeaderboardScope,
        window: TimeWindow,
        institution_id: Option<&str>,
    ) -> AppResult<Option<LeaderboardSnapshot>> {
        let snapshot = self
            .snapshots
            .find_one(Self::partition_filter(scope, window, institution_id), None)
            .await?;

        Ok(snapshot)
    }

    /// 读取GLOBAL榜单前limit行，联查用户名，按rank升序。
    ///
    /// 纯读操作：行集来自同一快照；分区尚未发布过时返回空列表。
    pub async fn get_top(
        &self,
        window: TimeWindow,
        limit: i64,
        profile_collection_name: &str,
    ) -> AppResult<Vec<LeaderboardRow>> {
        let snapshot = match self
            .current_snapshot(LeaderboardScope::Global, window, None)
            .await?
        {
            Some(snapshot) => snapshot,
            None => return Ok(Vec::new()),
        };

        let pipeline = vec![
            doc! { "$match": { "snapshot_id": &snapshot.snapshot_id } },
            doc! { "$sort": { "rank": 1 } },
            doc! { "$limit": limit },
            doc! {
                "$lookup": {
                    "from": profile_collection_name,
                    "localField": "user_id",
                    "foreignField": "user_id",
                    "as": "profile"
                }
            },
            doc! { "$unwind": "$profile" },
            doc! { "$addFields": { "username": "$profile.username" } },
            doc! { "$project": { "profile": 0 } },
        ];

        let mut cursor = self.entries.aggregate(pipeline, None).await?;
        let mut rows = Vec::new();

        while let Some(document) = cursor.try_next().await? {
            match mongodb::bson::from_document::<LeaderboardRow>(document) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    error!("❌ 反序列化榜单行失败: {}", e);
                }
            }
        }

        Ok(rows)
    }
}
