//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 待機中の切断：プールから取り除かれ、後続の参加者とペアにならないこと
//! - ペア中の切断：相手に peer-left が届くこと

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher};

use super::{SharedSessionRouter, delivery::push_deliveries};

/// 切断のユースケース
pub struct DisconnectClientUseCase {
    router: SharedSessionRouter,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(router: SharedSessionRouter, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            router,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// 未登録・切断済みの接続に対しては何もしない。
    ///
    /// # Returns
    ///
    /// peer-left を通知した相手の数（0 または 1）
    pub async fn execute(&self, connection_id: &ConnectionId) -> usize {
        let mut router = self.router.lock().await;
        let deliveries = router.disconnect(connection_id);

        self.message_pusher.unregister_client(connection_id).await;
        push_deliveries(self.message_pusher.as_ref(), deliveries).await
    }
}
