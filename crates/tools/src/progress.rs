//! 端末向けの進捗表示
//!
//! indicatif の進捗バー（stderr）と、`log::info!` に出す残り時間の見積もりを組み合わせる。

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use subscreen_core::{EtaLogger, ProgressSink, Stage};

/// 評価段階で見積もりをログに出す回数の目安
const ANALYSIS_LOG_STEPS: u64 = 20;

pub struct ConsoleProgress {
    eta: EtaLogger,
    bar: Mutex<Option<ProgressBar>>,
    show_bar: bool,
}

impl ConsoleProgress {
    pub fn new(show_bar: bool) -> Self {
        Self {
            eta: EtaLogger::new(),
            bar: Mutex::new(None),
            show_bar,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({per_sec}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn with_bar<T>(&self, f: impl FnOnce(Option<&ProgressBar>) -> T) -> T {
        let bar = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        f(bar.as_ref())
    }
}

/// 見積もりをログに出すか（構築段階はソースごと、評価段階は間引く）
fn should_log(stage: Stage, completed: u64, total: u64) -> bool {
    match stage {
        Stage::Generation => true,
        Stage::Analysis => {
            let step = (total / ANALYSIS_LOG_STEPS).max(1);
            completed % step == 0 || completed >= total
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn begin(&self, stage: Stage, total: u64) {
        self.eta.begin(stage, total);
        let bar = if self.show_bar {
            let bar = ProgressBar::new(total);
            bar.set_style(Self::style());
            bar.set_message(stage.label());
            bar
        } else {
            ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden())
        };
        let mut slot = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(bar);
    }

    fn advance(&self, stage: Stage, completed: u64, total: u64) {
        self.with_bar(|bar| {
            if let Some(bar) = bar {
                // 並列評価では完了数が前後して届くので巻き戻さない
                if completed > bar.position() {
                    bar.set_position(completed);
                }
            }
            if should_log(stage, completed, total) {
                match bar {
                    Some(bar) => bar.suspend(|| self.eta.advance(stage, completed, total)),
                    None => self.eta.advance(stage, completed, total),
                }
            }
        });
    }

    fn finish(&self, _stage: Stage) {
        let mut slot = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
    }
}
