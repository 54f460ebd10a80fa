//! UseCase: 統計情報の取得

use crate::domain::RouterStats;

use super::SharedSessionRouter;

/// 統計情報取得のユースケース
pub struct GetStatsUseCase {
    router: SharedSessionRouter,
}

impl GetStatsUseCase {
    /// 新しい GetStatsUseCase を作成
    pub fn new(router: SharedSessionRouter) -> Self {
        Self { router }
    }

    /// 接続数・ルーム数・カテゴリ別待機者数のスナップショットを返す
    pub async fn execute(&self) -> RouterStats {
        self.router.lock().await.stats()
    }
}
