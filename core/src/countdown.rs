//! ルーレットのカウントダウン

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 日程の整合性エラー
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("participation start must be before participation end")]
    StartAfterEnd,

    #[error("scheduled draw must not be before participation end")]
    DrawBeforeEnd,
}

/// ルーレットの日程
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouletteSchedule {
    #[serde(default)]
    pub participation_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub participation_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_draw: Option<DateTime<Utc>>,
}

/// 現在のフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoulettePhase {
    /// 受付開始前
    Upcoming { starts_in: Duration },
    /// 受付中（終了日時未設定なら None）
    Open { closes_in: Option<Duration> },
    /// 受付終了、抽選待ち（抽選日時未設定なら None）
    AwaitingDraw { draws_in: Option<Duration> },
    /// 抽選済み
    Finished,
}

impl RouletteSchedule {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if let (Some(start), Some(end)) = (self.participation_start, self.participation_end) {
            if start >= end {
                return Err(ScheduleError::StartAfterEnd);
            }
        }
        if let (Some(end), Some(draw)) = (self.participation_end, self.scheduled_draw) {
            if draw < end {
                return Err(ScheduleError::DrawBeforeEnd);
            }
        }
        Ok(())
    }

    pub fn phase(&self, now: DateTime<Utc>) -> RoulettePhase {
        if let Some(start) = self.participation_start {
            if now < start {
                return RoulettePhase::Upcoming { starts_in: start - now };
            }
        }
        match self.participation_end {
            Some(end) if now < end => RoulettePhase::Open { closes_in: Some(end - now) },
            None => RoulettePhase::Open { closes_in: None },
            Some(_) => match self.scheduled_draw {
                Some(draw) if now < draw => RoulettePhase::AwaitingDraw {
                    draws_in: Some(draw - now),
                },
                Some(_) => RoulettePhase::Finished,
                None => RoulettePhase::AwaitingDraw { draws_in: None },
            },
        }
    }
}

/// 残り時間の表示（1日以上なら "Nd HH:MM:SS"）
pub fn format_countdown(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let days = total / 86400;
    let hours = (total % 86400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, d, h, 0, 0).unwrap()
    }

    fn schedule() -> RouletteSchedule {
        RouletteSchedule {
            participation_start: Some(at(10, 0)),
            participation_end: Some(at(20, 0)),
            scheduled_draw: Some(at(21, 12)),
        }
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::seconds(0)), "00:00:00");
        assert_eq!(format_countdown(Duration::seconds(3725)), "01:02:05");
        assert_eq!(
            format_countdown(Duration::seconds(2 * 86400 + 3 * 3600 + 4 * 60 + 5)),
            "2d 03:04:05"
        );
        assert_eq!(format_countdown(Duration::seconds(-10)), "00:00:00");
    }

    #[test]
    fn test_phases() {
        let s = schedule();
        assert_eq!(s.phase(at(9, 0)), RoulettePhase::Upcoming { starts_in: Duration::days(1) });
        assert_eq!(s.phase(at(19, 0)), RoulettePhase::Open { closes_in: Some(Duration::days(1)) });
        assert_eq!(
            s.phase(at(21, 0)),
            RoulettePhase::AwaitingDraw { draws_in: Some(Duration::hours(12)) }
        );
        assert_eq!(s.phase(at(22, 0)), RoulettePhase::Finished);
    }

    #[test]
    fn test_open_ended_schedule() {
        let s = RouletteSchedule {
            participation_start: None,
            participation_end: None,
            scheduled_draw: None,
        };
        assert_eq!(s.phase(at(1, 0)), RoulettePhase::Open { closes_in: None });

        let s = RouletteSchedule {
            participation_end: Some(at(5, 0)),
            ..s
        };
        assert_eq!(s.phase(at(6, 0)), RoulettePhase::AwaitingDraw { draws_in: None });
    }

    #[test]
    fn test_validate() {
        assert!(schedule().validate().is_ok());

        let mut s = schedule();
        s.participation_start = Some(at(20, 0));
        assert_eq!(s.validate(), Err(ScheduleError::StartAfterEnd));

        let mut s = schedule();
        s.scheduled_draw = Some(at(19, 0));
        assert_eq!(s.validate(), Err(ScheduleError::DrawBeforeEnd));
    }
}
