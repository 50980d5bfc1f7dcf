////////////////////////////////////////////////////////////////////////
//
// 1. 每个Domain(Entity)单独一个文件夹
// 2. 每个Domain由两部分组成:
//    - model: 定义Schema
//    - repository: 实际的数据库底层操作
//
//////////////////////////////////////////////////////////////////////

use mongodb::{Client, Collection, IndexModel};
use mongodb::bson::doc;
use std::sync::Arc;
use tracing::info;
use utils::{AppConfig, AppResult};

pub mod badge;
pub mod disposal_event;
pub mod leaderboard;
pub mod profile;

use badge::model::{BadgeDefinition, UserBadge};
use badge::repository::BadgeRepository;
use disposal_event::model::DisposalEvent;
use disposal_event::repository::DisposalEventRepository;
use leaderboard::model::{LeaderboardEntry, LeaderboardSnapshot};
use leaderboard::repository::LeaderboardRepository;
use profile::model::UserProfile;

#[derive(Clone, Debug)]
pub struct Database {
    pub user_profiles: Collection<UserProfile>,
    pub badge_definitions: Collection<BadgeDefinition>,
    pub user_badges: Collection<UserBadge>,
    pub disposal_events: Collection<DisposalEvent>,
    pub leaderboard_entries: Collection<LeaderboardEntry>,
    pub leaderboard_snapshots: Collection<LeaderboardSnapshot>,
    // 仓库层
    pub badge_repository: BadgeRepository,
    pub disposal_event_repository: DisposalEventRepository,
    pub leaderboard_repository: LeaderboardRepository,
}

impl Database {
    pub async fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let client = Client::with_uri_str(&config.mongo_uri).await?;
        let db: mongodb::Database = client.database(&config.mongo_db);

        let user_profiles = db.collection("UserProfile");
        let badge_definitions = db.collection("BadgeDefinition");
        let user_badges = db.collection("UserBadge");
        let disposal_events = db.collection("DisposalEvent");
        let leaderboard_entries = db.collection("LeaderboardEntry");
        let leaderboard_snapshots = db.collection("LeaderboardSnapshot");

        // 初始化仓库层
        let badge_repository = BadgeRepository::new(badge_definitions.clone(), user_badges.clone());
        let disposal_event_repository = DisposalEventRepository::new(disposal_events.clone());
        let leaderboard_repository =
            LeaderboardRepository::new(leaderboard_entries.clone(), leaderboard_snapshots.clone());

        info!("🧱 database({:#}) connected.", &config.mongo_db);

        Ok(Database {
            user_profiles,
            badge_definitions,
            user_badges,
            disposal_events,
            leaderboard_entries,
            leaderboard_snapshots,
            badge_repository,
            disposal_event_repository,
            leaderboard_repository,
        })
    }

    /// 初始化各集合的二级索引
    pub async fn init_repository_indexes(&self) -> AppResult<()> {
        // 用户档案：user_id唯一索引
        let profile_indexes = vec![IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(
                mongodb::options::IndexOptions::builder()
                    .unique(true)
                    .name("user_id_unique".to_string())
                    .build(),
            )
            .build()];
        self.user_profiles.create_indexes(profile_indexes, None).await?;

        let _result = self.badge_repository.init_indexes().await;
        let _result = self.disposal_event_repository.init_indexes().await;
        let _result = self.leaderboard_repository.init_indexes().await;

        info!("✅ 数据库索引初始化完成");
        Ok(())
    }
}

// Re-export specific items to avoid naming conflicts
pub use badge::model::{BadgeType, UserBadgeWithDefinition};
pub use disposal_event::model::{EventStatus, WindowScore};
pub use leaderboard::model::{LeaderboardScope, RankedScore, TimeWindow};
pub use profile::model::ProfileUpdate;
pub use profile::repository::{DynProfileRepository, ProfileRepositoryTrait};
