//! Server state shared by every handler.

use std::sync::Arc;

use deai_shared::time::Clock;

use crate::usecase::{
    ConnectClientUseCase, DisconnectClientUseCase, GetStatsUseCase, JoinCategoryUseCase,
    NextPeerUseCase, RelaySignalUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（接続のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// JoinCategoryUseCase（カテゴリ参加のユースケース）
    pub join_category_usecase: Arc<JoinCategoryUseCase>,
    /// NextPeerUseCase（next のユースケース）
    pub next_peer_usecase: Arc<NextPeerUseCase>,
    /// RelaySignalUseCase（中継のユースケース）
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    /// DisconnectClientUseCase（切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// GetStatsUseCase（統計情報取得のユースケース）
    pub get_stats_usecase: Arc<GetStatsUseCase>,
    /// Clock used for HTTP response timestamps
    pub clock: Arc<dyn Clock>,
}
