/// 定期更新タイマー
///
/// 画面のマウントからアンマウントまでの間だけ動作する。時刻はミリ秒で外から渡す
/// （WASMでは `js_sys::Date::now()`）。
#[derive(Debug, Clone)]
pub struct PollTimer {
    interval_ms: f64,
    next_due: Option<f64>,
}

impl PollTimer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            next_due: None,
        }
    }

    /// 開始（初回は即時）
    pub fn start(&mut self, now_ms: f64) {
        self.next_due = Some(now_ms);
    }

    /// 停止
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// 実行時刻に達していれば次回を予約して true
    pub fn take_due(&mut self, now_ms: f64) -> bool {
        match self.next_due {
            Some(due) if now_ms >= due => {
                self.next_due = Some(now_ms + self.interval_ms);
                true
            }
            _ => false,
        }
    }

    /// 次回までの残り時間
    pub fn remaining_ms(&self, now_ms: f64) -> Option<f64> {
        self.next_due.map(|due| (due - now_ms).max(0.0))
    }
}
