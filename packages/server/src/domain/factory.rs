//! Domain factories for creating identifiers.

use super::{ConnectionId, RoomId, error::ValueObjectError};

/// Factory for generating ConnectionId instances.
///
/// A connection id is issued once per WebSocket upgrade.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a new ConnectionId with a random UUID v4.
    ///
    /// # Errors
    ///
    /// This method should not fail in practice, but returns Result for consistency
    /// with the domain error handling pattern.
    pub fn generate() -> Result<ConnectionId, ValueObjectError> {
        ConnectionId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Factory for deriving RoomId instances from a pairing.
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Derive the room id for `requester` paired with `waiter`.
    ///
    /// The id is `"{requester}-{waiter}-{sequence}"`. It is order-dependent, and the
    /// sequence keeps it unique when the same two connections meet again.
    pub fn for_pair(requester: &ConnectionId, waiter: &ConnectionId, sequence: u64) -> RoomId {
        RoomId::from_pairing(requester, waiter, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_factory_generate() {
        // テスト項目: ConnectionIdFactory::generate() で UUID v4 形式の ID を生成できる
        // when (操作):
        let id1 = ConnectionIdFactory::generate().unwrap();
        let id2 = ConnectionIdFactory::generate().unwrap();

        // then (期待する結果):
        assert_eq!(id1.as_str().len(), 36);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_room_id_for_pair() {
        // テスト項目: RoomId はリクエスト側・待機側・連番から導出される
        // given (前提条件):
        let alice = ConnectionId::new("alice".to_string()).unwrap();
        let bob = ConnectionId::new("bob".to_string()).unwrap();

        // when (操作):
        let first = RoomIdFactory::for_pair(&alice, &bob, 1);
        let again = RoomIdFactory::for_pair(&alice, &bob, 2);
        let reversed = RoomIdFactory::for_pair(&bob, &alice, 1);

        // then (期待する結果):
        assert_eq!(first.as_str(), "alice-bob-1");
        assert_ne!(first, again);
        assert_ne!(first, reversed);
    }
}
