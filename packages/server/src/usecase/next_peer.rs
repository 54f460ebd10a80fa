//! UseCase: 次の相手を探す処理（next）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - NextPeerUseCase::execute() メソッド
//! - ペア中の next：相手への peer-left 通知と再マッチング
//! - 待機中の next：二重登録されないこと（冪等性）

use std::sync::Arc;

use deai_shared::time::Clock;

use crate::domain::{Category, ConnectionId, MessagePusher, SessionError, Timestamp};

use super::{SharedSessionRouter, delivery::push_deliveries};

/// next のユースケース
pub struct NextPeerUseCase {
    router: SharedSessionRouter,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl NextPeerUseCase {
    /// 新しい NextPeerUseCase を作成
    pub fn new(
        router: SharedSessionRouter,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            router,
            message_pusher,
            clock,
        }
    }

    /// next を実行
    ///
    /// 現在の相手から離れ、すぐに新しい相手を探す。
    ///
    /// # Arguments
    ///
    /// * `connection_id` - next を要求した接続の ID
    /// * `category` - 次にマッチングするカテゴリ（`None` なら現在のカテゴリ）
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 配送したイベント数
    /// * `Err(SessionError)` - プロトコル違反（呼び出し側でログに残して無視する）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        category: Option<Category>,
    ) -> Result<usize, SessionError> {
        let now = Timestamp::new(self.clock.now_millis());

        let mut router = self.router.lock().await;
        let deliveries = router.next(connection_id, category, now)?;

        Ok(push_deliveries(self.message_pusher.as_ref(), deliveries).await)
    }
}
