//! Conversion logic between DTOs and domain types.

use crate::domain::{
    Category, ClientRequest, RoomId, RouterStats, ServerEvent, SignalKind, ValueObjectError,
};
use crate::infrastructure::dto::{http::StatsDto, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

fn parse_category(category: Option<String>) -> Result<Option<Category>, ValueObjectError> {
    category.map(Category::try_from).transpose()
}

fn relay(
    room: String,
    kind: SignalKind,
    payload: serde_json::Value,
) -> Result<ClientRequest, ValueObjectError> {
    Ok(ClientRequest::Relay {
        room: RoomId::try_from(room)?,
        kind,
        payload,
    })
}

impl TryFrom<dto::ClientMessage> for ClientRequest {
    type Error = ValueObjectError;

    fn try_from(message: dto::ClientMessage) -> Result<Self, Self::Error> {
        match message {
            dto::ClientMessage::JoinCategory { category } => Ok(ClientRequest::JoinCategory {
                category: parse_category(category)?,
            }),
            dto::ClientMessage::Next { category } => Ok(ClientRequest::Next {
                category: parse_category(category)?,
            }),
            dto::ClientMessage::Offer { room, payload } => relay(room, SignalKind::Offer, payload),
            dto::ClientMessage::Answer { room, payload } => {
                relay(room, SignalKind::Answer, payload)
            }
            dto::ClientMessage::IceCandidate { room, payload } => {
                relay(room, SignalKind::IceCandidate, payload)
            }
            dto::ClientMessage::ChatMessage { room, payload } => {
                relay(room, SignalKind::ChatMessage, payload)
            }
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<ServerEvent> for dto::ServerMessage {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::Connected { connection_id } => Self::Connected {
                connection_id: connection_id.into_string(),
            },
            ServerEvent::Ready { room } => Self::Ready {
                room: room.into_string(),
            },
            ServerEvent::PeerLeft => Self::PeerLeft,
            ServerEvent::Signal { kind, payload } => match kind {
                SignalKind::Offer => Self::Offer { payload },
                SignalKind::Answer => Self::Answer { payload },
                SignalKind::IceCandidate => Self::IceCandidate { payload },
                SignalKind::ChatMessage => Self::ChatMessage { payload },
            },
        }
    }
}

impl StatsDto {
    /// Build the stats response from a router snapshot.
    pub fn from_stats(stats: RouterStats, generated_at: String) -> Self {
        Self {
            connections: stats.connections,
            rooms: stats.rooms,
            waiting: stats
                .waiting
                .into_iter()
                .map(|(category, count)| (category.as_str().to_string(), count))
                .collect(),
            generated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionId;
    use serde_json::json;

    fn parse(text: &str) -> dto::ClientMessage {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_join_category_frame_to_request() {
        // テスト項目: join-category フレームがドメインのリクエストに変換される
        // given (前提条件):
        let message = parse(r#"{"type":"join-category","category":"text"}"#);

        // when (操作):
        let request = ClientRequest::try_from(message).unwrap();

        // then (期待する結果):
        assert_eq!(
            request,
            ClientRequest::JoinCategory {
                category: Some(Category::new("text".to_string()).unwrap())
            }
        );
    }

    #[test]
    fn test_waiting_alias_without_category() {
        // テスト項目: waiting フレーム（カテゴリ省略）も join-category として扱われる
        let message = parse(r#"{"type":"waiting"}"#);

        let request = ClientRequest::try_from(message).unwrap();

        assert_eq!(request, ClientRequest::JoinCategory { category: None });
    }

    #[test]
    fn test_relay_frame_keeps_payload_verbatim() {
        // テスト項目: ice-candidate フレームのペイロードはそのまま保持される
        let payload = json!({"candidate": "candidate:1 1 udp 2122260223 10.0.0.1 54321 typ host", "sdpMLineIndex": 0});
        let text = json!({"type": "ice-candidate", "room": "a-b-1", "payload": payload}).to_string();

        let request = ClientRequest::try_from(parse(&text)).unwrap();

        assert_eq!(
            request,
            ClientRequest::Relay {
                room: RoomId::new("a-b-1".to_string()).unwrap(),
                kind: SignalKind::IceCandidate,
                payload,
            }
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        // テスト項目: 不正なカテゴリや空のルーム ID は変換エラーになる
        let bad_category = parse(r#"{"type":"next","category":"Video Chat"}"#);
        let empty_room = parse(r#"{"type":"offer","room":"","payload":{}}"#);

        assert!(ClientRequest::try_from(bad_category).is_err());
        assert_eq!(
            ClientRequest::try_from(empty_room),
            Err(ValueObjectError::RoomIdEmpty)
        );
    }

    #[test]
    fn test_unknown_frame_type_fails_to_parse() {
        // テスト項目: 未知の type のフレームはパースできない
        let result = serde_json::from_str::<dto::ClientMessage>(r#"{"type":"shout"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_server_events_to_json() {
        // テスト項目: サーバーイベントが type タグ付きの JSON に変換される
        // given (前提条件):
        let ready = ServerEvent::Ready {
            room: RoomId::new("a-b-1".to_string()).unwrap(),
        };
        let connected = ServerEvent::Connected {
            connection_id: ConnectionId::new("alice".to_string()).unwrap(),
        };
        let signal = ServerEvent::Signal {
            kind: SignalKind::ChatMessage,
            payload: json!("hello"),
        };

        // when (操作):
        let to_json = |event: ServerEvent| {
            serde_json::to_value(dto::ServerMessage::from(event)).unwrap()
        };

        // then (期待する結果):
        assert_eq!(to_json(ready), json!({"type": "ready", "room": "a-b-1"}));
        assert_eq!(
            to_json(connected),
            json!({"type": "connected", "connection_id": "alice"})
        );
        assert_eq!(to_json(ServerEvent::PeerLeft), json!({"type": "peer-left"}));
        assert_eq!(
            to_json(signal),
            json!({"type": "chat-message", "payload": "hello"})
        );
    }

    #[test]
    fn test_stats_dto_from_router_stats() {
        // テスト項目: RouterStats がカテゴリ名をキーにした DTO に変換される
        let stats = RouterStats {
            connections: 3,
            rooms: 1,
            waiting: vec![
                (Category::new("video".to_string()).unwrap(), 0),
                (Category::new("text".to_string()).unwrap(), 1),
            ],
        };

        let dto = StatsDto::from_stats(stats, "2023-01-01T00:00:00+00:00".to_string());

        assert_eq!(dto.connections, 3);
        assert_eq!(dto.rooms, 1);
        assert_eq!(dto.waiting.get("text"), Some(&1));
        assert_eq!(dto.waiting.get("video"), Some(&0));
    }
}
