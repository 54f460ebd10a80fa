//! UseCase: カテゴリ参加処理
//!
//! 待機者がいればペアにして両者に ready を送り、いなければ待機プールに入れる。

use std::sync::Arc;

use deai_shared::time::Clock;

use crate::domain::{Category, ConnectionId, MessagePusher, SessionError, Timestamp};

use super::{SharedSessionRouter, delivery::push_deliveries};

/// カテゴリ参加のユースケース
pub struct JoinCategoryUseCase {
    router: SharedSessionRouter,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl JoinCategoryUseCase {
    /// 新しい JoinCategoryUseCase を作成
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

    /// カテゴリ参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続の ID
    /// * `category` - 参加するカテゴリ（`None` ならデフォルトカテゴリ）
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - ペアが成立したら `true`、待機中なら `false`
    /// * `Err(SessionError)` - プロトコル違反（呼び出し側でログに残して無視する）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        category: Option<Category>,
    ) -> Result<bool, SessionError> {
        let now = Timestamp::new(self.clock.now_millis());

        let mut router = self.router.lock().await;
        let category =
            category.unwrap_or_else(|| router.matchmaker().default_category().clone());
        let deliveries = router.join_category(connection_id, category, now)?;
        let paired = !deliveries.is_empty();
        push_deliveries(self.message_pusher.as_ref(), deliveries).await;

        Ok(paired)
    }
}
