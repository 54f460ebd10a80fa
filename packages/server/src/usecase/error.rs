//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::SessionError;

/// 接続処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// 同じ接続 ID が既に登録されている
    #[error("Connection '{0}' is already registered")]
    DuplicateConnection(String),

    /// SessionRouter がその他の理由で拒否した
    #[error(transparent)]
    Rejected(SessionError),
}
