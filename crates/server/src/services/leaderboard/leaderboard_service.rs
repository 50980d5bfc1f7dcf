use crate::services::leaderboard::ranking;
use chrono::{DateTime, Utc};
use database::{
    leaderboard::model::{LeaderboardRow, LeaderboardScope, TimeWindow},
    Database, ProfileRepositoryTrait, RankedScore,
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::{info, warn};
use utils::AppResult;

/// 榜单服务：读路径 + 全量重算编排
///
/// 分区之间互不阻塞地独立重算；同一分区通过try_lock保证同一时刻至多一个
/// 写者，已有任务在跑时直接跳过本轮而不是排队。
pub struct LeaderboardService {
    database: Arc<Database>,
    partition_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LeaderboardService {
    pub fn new(database: Arc<Database>) -> Self {
        Self {
            database,
            partition_locks: Mutex::new(HashMap::new()),
        }
    }

    /// GLOBAL榜单前limit行，按rank升序。纯读操作，行集来自同一快照
    pub async fn get_leaderboard(&self, window: TimeWindow, limit: i64) -> AppResult<Vec<LeaderboardRow>> {
        self.database
            .leaderboard_repository
            .get_top(window, limit, self.database.user_profiles.name())
            .await
    }

    /// 重算并发布一个分区的快照。返回false表示该分区已有任务在跑，本轮跳过
    pub async fn recompute_partition(
        &self,
        scope: LeaderboardScope,
        window: TimeWindow,
        institution_id: Option<String>,
        as_of: DateTime<Utc>,
    ) -> AppResult<bool> {
        let lock = self.partition_lock(scope, window, institution_id.as_deref()).await;
        let guard = match lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!(
                    "⚠️ 分区{}({:?})已有重算任务在执行，跳过本轮",
                    window.as_str(),
                    institution_id
                );
                return Ok(false);
            }
        };

        let bounds = ranking::window_bounds(window, as_of);
        let scores = self
            .database
            .disposal_event_repository
            .aggregate_window_scores(
                institution_id.as_deref(),
                bounds.start.timestamp(),
                bounds.end.timestamp(),
            )
            .await?;

        let ranked = ranking::assign_ranks(scores);

        self.database
            .leaderboard_repository
            .publish(
                scope,
                window,
                institution_id.as_deref(),
                bounds.start.timestamp(),
                bounds.end.timestamp(),
                &ranked,
            )
            .await?;

        // 总榜发布后回写档案上冗余缓存的排名
        if scope == LeaderboardScope::Global && window == TimeWindow::AllTime {
            self.write_back_profile_ranks(&ranked).await?;
        }

        drop(guard);
        Ok(true)
    }

    /// 重算全部分区：GLOBAL×全部窗口，再对每个出现过合格事件的机构逐一重算
    pub async fn recompute_all(&self, as_of: DateTime<Utc>) -> AppResult<()> {
        for window in TimeWindow::ALL {
            self.recompute_partition(LeaderboardScope::Global, window, None, as_of)
                .await?;
        }

        let institutions = self
            .database
            .disposal_event_repository
            .distinct_verified_institutions()
            .await?;

        for institution_id in institutions {
            for window in TimeWindow::ALL {
                self.recompute_partition(
                    LeaderboardScope::Institution,
                    window,
                    Some(institution_id.clone()),
                    as_of,
                )
                .await?;
            }
        }

        info!("✅ 全部榜单分区重算完成");
        Ok(())
    }

    async fn write_back_profile_ranks(&self, ranked: &[RankedScore]) -> AppResult<()> {
        let pairs: Vec<(String, u32)> = ranked
            .iter()
            .map(|ranked_score| (ranked_score.user_id.clone(), ranked_score.rank))
            .collect();

        self.database.write_back_ranks(&pairs).await
    }

    async fn partition_lock(
        &self,
        scope: LeaderboardScope,
        window: TimeWindow,
        institution_id: Option<&str>,
    ) -> Arc<Mutex<()>> {
        let key = format!(
            "{}|{}|{}",
            scope.as_str(),
            window.as_str(),
            institution_id.unwrap_or("")
        );

        let mut locks = self.partition_locks.lock().await;
        locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use database::disposal_event::model::EventStatus;
    use utils::AppConfig;

    /// 创建测试用的数据库连接（独立库）
    async fn setup_service() -> LeaderboardService {
        std::env::set_var("MONGO_DB", "test_db_leaderboard_service");
        let config = Arc::new(AppConfig::new_for_test());
        let db = Database::new(config).await.unwrap();
        db.user_profiles.drop(None).await.ok();
        db.disposal_events.drop(None).await.ok();
        db.leaderboard_entries.drop(None).await.ok();
        db.leaderboard_snapshots.drop(None).await.ok();

        LeaderboardService::new(Arc::new(db))
    }

    async fn verified_event(service: &LeaderboardService, user_id: &str, points: u64, occurred_at: i64) {
        let event = service
            .database
            .disposal_event_repository
            .submit(user_id, None, points, occurred_at, occurred_at)
            .await
            .unwrap();
        service
            .database
            .disposal_event_repository
            .update_status(&event.id.unwrap(), EventStatus::Verified, occurred_at)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_recompute_publishes_dense_ranks_with_deterministic_ties() {
        let service = setup_service().await;
        let db = &service.database;

        db.create_profile("u1", "alice", None).await.unwrap();
        db.create_profile("u2", "bob", None).await.unwrap();
        db.create_profile("u3", "carol", None).await.unwrap();

        let as_of = Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap().timestamp();

        // u2与u3同为500分：u3先达到该分数，应排在前面
        verified_event(&service, "u2", 500, monday + 600).await;
        verified_event(&service, "u3", 500, monday + 60).await;
        verified_event(&service, "u1", 300, monday + 120).await;

        service
            .recompute_partition(LeaderboardScope::Global, TimeWindow::Weekly, None, as_of)
            .await
            .unwrap();

        let rows = service.get_leaderboard(TimeWindow::Weekly, 10).await.unwrap();
        let order: Vec<(u32, &str, u64)> = rows
            .iter()
            .map(|r| (r.entry.rank, r.entry.user_id.as_str(), r.entry.score))
            .collect();
        assert_eq!(order, vec![(1, "u3", 500), (2, "u2", 500), (3, "u1", 300)]);
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_all_time_recompute_writes_back_profile_ranks() {
        let service = setup_service().await;
        let db = &service.database;

        db.create_profile("u1", "alice", None).await.unwrap();
        db.create_profile("u2", "bob", None).await.unwrap();

        verified_event(&service, "u1", 100, 1000).await;
        verified_event(&service, "u2", 900, 1000).await;

        service.recompute_all(Utc::now()).await.unwrap();

        assert_eq!(db.get_profile("u2").await.unwrap().unwrap().rank, Some(1));
        assert_eq!(db.get_profile("u1").await.unwrap().unwrap().rank, Some(2));
    }

    #[tokio::test]
    #[ignore = "requires a local MongoDB (MONGO_URI)"]
    async fn test_empty_window_publishes_empty_board() {
        let service = setup_service().await;

        service
            .recompute_partition(LeaderboardScope::Global, TimeWindow::Daily, None, Utc::now())
            .await
            .unwrap();

        let rows = service.get_leaderboard(TimeWindow::Daily, 10).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_partition_lock_skips_overlapping_writer() {
        // 不触数据库：先占住分区锁，再发起重算，应当直接跳过
        std::env::set_var("MONGO_DB", "test_db_lock");
        let config = Arc::new(AppConfig::new_for_test());
        let db = Database::new(config).await.unwrap();
        let service = LeaderboardService::new(Arc::new(db));

        let lock = service
            .partition_lock(LeaderboardScope::Global, TimeWindow::Daily, None)
            .await;
        let _held = lock.lock().await;

        let result = service
            .recompute_partition(LeaderboardScope::Global, TimeWindow::Daily, None, Utc::now())
            .await
            .unwrap();
        assert!(!result, "同一分区已有写者时应跳过本轮重算");
    }
}
