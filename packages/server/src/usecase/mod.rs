//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層（SessionRouter）を操作し、結果を MessagePusher で配送します。

pub mod connect_client;
mod delivery;
pub mod disconnect_client;
pub mod error;
pub mod get_stats;
pub mod join_category;
pub mod next_peer;
pub mod relay_signal;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::SessionRouter;

pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::ConnectError;
pub use get_stats::GetStatsUseCase;
pub use join_category::JoinCategoryUseCase;
pub use next_peer::NextPeerUseCase;
pub use relay_signal::RelaySignalUseCase;

/// SessionRouter shared by every use case.
///
/// One lock guards sessions, rooms and waiting pools together.
pub type SharedSessionRouter = Arc<Mutex<SessionRouter>>;
