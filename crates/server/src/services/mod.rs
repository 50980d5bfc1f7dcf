////////////////////////////////////////////////////////////////////////
//
// Service层：每个Domain单独一个文件夹，持有仓库层并承载业务规则，
// Controller只做参数提取与响应封装。
//
//////////////////////////////////////////////////////////////////////

pub mod badge;
pub mod event;
pub mod leaderboard;
pub mod profile;

use badge::badge_service::{BadgeService, DynBadgeService};
use database::Database;
use event::event_service::{DisposalEventService, DynDisposalEventService};
use leaderboard::leaderboard_service::LeaderboardService;
use profile::profile_service::{DynProfileService, ProfileService};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct Services {
    pub profile: DynProfileService,
    pub badge: DynBadgeService,
    pub event: DynDisposalEventService,
    pub leaderboard: Arc<LeaderboardService>,
    pub database: Arc<Database>,
}

impl Services {
    pub fn new(db: Database) -> Self {
        let database = Arc::new(db);

        let profile = Arc::new(ProfileService::new(database.clone())) as DynProfileService;
        let badge = Arc::new(BadgeService::new(database.clone())) as DynBadgeService;
        let event = Arc::new(DisposalEventService::new(database.clone())) as DynDisposalEventService;
        let leaderboard = Arc::new(LeaderboardService::new(database.clone()));

        info!("🧠 services initialized");

        Self {
            profile,
            badge,
            event,
            leaderboard,
            database,
        }
    }

    /// 初始化数据库服务（建索引），服务启动时调用一次
    pub async fn init_database_service(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🔧 初始化数据库索引...");

        match self.database.init_repository_indexes().await {
            Ok(_) => {
                info!("✅ 数据库索引初始化完成");
                Ok(())
            }
            Err(e) => {
                error!("❌ 数据库索引初始化失败: {}", e);
                warn!("⚠️ 继续启动服务，但查询性能可能受影响");
                Err(format!("索引初始化失败: {}", e).into())
            }
        }
    }
}
