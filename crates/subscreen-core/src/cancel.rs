//! 協調的キャンセル

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 外側ループ 1 回ごとに確認される中断フラグ。
///
/// clone したトークンは同じフラグを共有する（Ctrl-C ハンドラ側で `cancel()` する）。
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
