//! 排名分配与时间窗口边界的纯函数实现。
//!
//! 排序规则是固定约定：分数降序，同分按先达到者在前(reached_at升序)，
//! 仍相同按user_id字典序升序。总序保证同一批输入重算多少次结果都一致。

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use database::{RankedScore, TimeWindow, WindowScore};

/// 时间窗口边界，半开区间[start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// 计算窗口边界。基准时区固定为UTC，周窗口为ISO周（周一起算）。
///
/// ALL_TIME从Unix纪元起算，终点为as_of本身。
pub fn window_bounds(window: TimeWindow, as_of: DateTime<Utc>) -> WindowBounds {
    match window {
        TimeWindow::Daily => {
            let start = day_start(as_of.date_naive());
            WindowBounds {
                start,
                end: start + Duration::days(1),
            }
        }
        TimeWindow::Weekly => {
            let offset = as_of.date_naive().weekday().num_days_from_monday() as i64;
            let start = day_start(as_of.date_naive() - Duration::days(offset));
            WindowBounds {
                start,
                end: start + Duration::days(7),
            }
        }
        TimeWindow::Monthly => {
            let date = as_of.date_naive();
            let start = day_start(date.with_day(1).unwrap());
            let next_month = if date.month() == 12 {
                NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap()
            } else {
                NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1).unwrap()
            };
            WindowBounds {
                start,
                end: day_start(next_month),
            }
        }
        TimeWindow::AllTime => WindowBounds {
            start: DateTime::UNIX_EPOCH,
            end: as_of,
        },
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

/// 为窗口积分分配名次：1..=N连续编号，无并列无空洞。
pub fn assign_ranks(mut scored: Vec<WindowScore>) -> Vec<RankedScore> {
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.reached_at.cmp(&b.reached_at))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(index, window_score)| RankedScore {
            rank: (index + 1) as u32,
            user_id: window_score.user_id,
            score: window_score.score,
            reached_at: window_score.reached_at,
        })
        .collect()
}
