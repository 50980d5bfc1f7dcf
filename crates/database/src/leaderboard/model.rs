use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 榜单范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaderboardScope {
    Global,
    Institution,
}

impl LeaderboardScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardScope::Global => "GLOBAL",
            LeaderboardScope::Institution => "INSTITUTION",
        }
    }
}

/// 榜单时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeWindow {
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Daily,
        TimeWindow::Weekly,
        TimeWindow::Monthly,
        TimeWindow::AllTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Daily => "DAILY",
            TimeWindow::Weekly => "WEEKLY",
            TimeWindow::Monthly => "MONTHLY",
            TimeWindow::AllTime => "ALL_TIME",
        }
    }
}

/// 榜单缓存行：一个快照内一个用户占一行
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    /// MongoDB文档ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    /// 上榜用户
    pub user_id: String,
    /// 榜单范围
    pub scope: LeaderboardScope,
    /// 时间窗口
    pub time_window: TimeWindow,
    /// 名次。同一分区内从1开始连续编号，无并列无空洞
    pub rank: u32,
    /// 窗口内积分
    pub score: u64,
    /// scope=INSTITUTION时为机构标识，GLOBAL为空
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<String>,
    /// 窗口起点时间戳（含）
    pub period_start: i64,
    /// 窗口终点时间戳（不含）
    pub period_end: i64,
    /// 快照生成时间戳
    pub updated_at: i64,
    /// 所属快照。读取方先解析快照指针再按此字段过滤
    pub snapshot_id: String,
}

/// 榜单快照指针：每个分区一个文档，单文档原子更新完成快照切换
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardSnapshot {
    /// MongoDB文档ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    pub scope: LeaderboardScope,
    pub time_window: TimeWindow,
    pub institution_id: Option<String>,
    /// 当前生效的快照
    pub snapshot_id: String,
    pub period_start: i64,
    pub period_end: i64,
    pub published_at: i64,
}

/// 榜单行与用户名的联查结果（客户端消费的读模型）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardRow {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    /// 联查出的展示昵称
    pub username: String,
}

/// 排名分配结果：总序中一个用户的名次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedScore {
    pub rank: u32,
    pub user_id: String,
    pub score: u64,
    pub reached_at: i64,
}
