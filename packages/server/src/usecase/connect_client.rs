//! UseCase: 接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//! - セッションの登録と MessagePusher への登録、connected イベントの送信
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - 異常系：重複した接続 ID

use std::sync::Arc;

use deai_shared::time::Clock;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel, SessionError, Timestamp};

use super::{SharedSessionRouter, delivery::push_deliveries, error::ConnectError};

/// 接続のユースケース
pub struct ConnectClientUseCase {
    router: SharedSessionRouter,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
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

    /// 接続を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 接続の ID（Domain Model）
    /// * `sender` - 接続へのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Timestamp)` - 接続成功（接続時刻を返す）
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<Timestamp, ConnectError> {
        let connected_at = Timestamp::new(self.clock.now_millis());

        let mut router = self.router.lock().await;
        let deliveries = router
            .connect(connection_id.clone(), connected_at)
            .map_err(|e| match e {
                SessionError::DuplicateConnection(id) => ConnectError::DuplicateConnection(id),
                other => ConnectError::Rejected(other),
            })?;

        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        push_deliveries(self.message_pusher.as_ref(), deliveries).await;

        Ok(connected_at)
    }
}
