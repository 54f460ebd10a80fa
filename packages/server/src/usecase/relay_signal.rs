//! UseCase: シグナリングメッセージの中継
//!
//! offer / answer / ice-candidate / chat-message をルームの相手にそのまま転送する。
//! 相手がいなければ黙って破棄する（ベストエフォート配送）。

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{ConnectionId, MessagePusher, RoomId, SessionError, SignalKind};

use super::{SharedSessionRouter, delivery::push_deliveries};

/// 中継のユースケース
pub struct RelaySignalUseCase {
    router: SharedSessionRouter,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    /// 新しい RelaySignalUseCase を作成
    pub fn new(router: SharedSessionRouter, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            router,
            message_pusher,
        }
    }

    /// 中継を実行
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 相手に配送した
    /// * `Ok(false)` - ルームが既に解散していたため破棄した
    /// * `Err(SessionError)` - 送信者がルームのメンバーではない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room: &RoomId,
        kind: SignalKind,
        payload: Value,
    ) -> Result<bool, SessionError> {
        let router = self.router.lock().await;
        let deliveries = router.relay(connection_id, room, kind, payload)?;

        Ok(push_deliveries(self.message_pusher.as_ref(), deliveries).await > 0)
    }
}
