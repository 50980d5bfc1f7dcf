use database::leaderboard::model::TimeWindow;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 100;

/// 榜单查询参数。范围固定为GLOBAL
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQueryDto {
    /// 时间窗口，缺省为ALL_TIME
    pub time_window: Option<TimeWindow>,
    /// 返回行数上限，缺省100，最大100
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl LeaderboardQueryDto {
    pub fn time_window(&self) -> TimeWindow {
        self.time_window.unwrap_or(TimeWindow::AllTime)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
    }
}
