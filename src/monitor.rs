//! ジョブ監視（スピナー表示）

use crate::poller::JobPoller;
use edgar_common::{BackendState, JobState};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// 連続失敗でこの回数に達したら監視をやめる
const MAX_POLL_FAILURES: u32 = 5;

/// 作業中の間ポーリングを続ける
///
/// `grace_polls` は作業開始前（No Work）を何回まで待つか。
/// 投入直後はバックエンドがまだ No Work を返すことがある。
pub async fn watch_job(
    poller: &JobPoller,
    interval: Duration,
    grace_polls: u32,
) -> Option<BackendState> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("ジョブ状態を確認中...");

    let mut ticker = tokio::time::interval(interval);
    let mut seen_working = false;
    let mut idle_polls = 0;
    let mut failures = 0;
    let mut last = None;

    loop {
        ticker.tick().await;
        let Some(state) = poller.poll_once().await else {
            failures += 1;
            if failures >= MAX_POLL_FAILURES {
                break;
            }
            spinner.set_message("ジョブ状態の取得に失敗、再試行中...");
            continue;
        };
        failures = 0;
        spinner.set_message(format!("ジョブ状態: {}", state.state));

        let finished = match state.state {
            JobState::Working => {
                seen_working = true;
                false
            }
            JobState::Complete | JobState::Error => true,
            JobState::NoWork => {
                idle_polls += 1;
                seen_working || idle_polls > grace_polls
            }
        };
        last = Some(state);
        if finished {
            break;
        }
    }

    spinner.finish_and_clear();
    last
}
