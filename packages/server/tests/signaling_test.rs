//! Integration tests that drive the signaling server over real WebSocket and HTTP connections.

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use deai_server::{
    domain::{Category, Matchmaker, SessionRouter},
    infrastructure::message_pusher::WebSocketMessagePusher,
    ui::Server,
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetStatsUseCase, JoinCategoryUseCase,
        NextPeerUseCase, RelaySignalUseCase,
    },
};
use deai_shared::time::{Clock, SystemClock};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{Mutex, oneshot},
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE: Duration = Duration::from_millis(200);

/// Helper struct to manage an in-process server lifecycle
struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a server with the `video` and `text` categories on an ephemeral port
    async fn start() -> Self {
        let categories = ["video", "text"]
            .into_iter()
            .map(|c| Category::new(c.to_string()).unwrap());
        let matchmaker = Matchmaker::new(categories).unwrap();
        let router = Arc::new(Mutex::new(SessionRouter::new(matchmaker)));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));

        let server = Server::new(
            Arc::new(ConnectClientUseCase::new(
                router.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            Arc::new(JoinCategoryUseCase::new(
                router.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            Arc::new(NextPeerUseCase::new(
                router.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            Arc::new(RelaySignalUseCase::new(
                router.clone(),
                message_pusher.clone(),
            )),
            Arc::new(DisconnectClientUseCase::new(
                router.clone(),
                message_pusher.clone(),
            )),
            Arc::new(GetStatsUseCase::new(router)),
            clock,
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = server
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await;
        });

        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stats(&self) -> Value {
        reqwest::get(self.http_url("/api/stats"))
            .await
            .unwrap()
            .json::<Value>()
            .await
            .unwrap()
    }

    /// Poll the stats endpoint until `category` has `expected` waiters
    async fn wait_for_waiting(&self, category: &str, expected: u64) {
        for _ in 0..100 {
            if self.stats().await["waiting"][category] == json!(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("{} never reached {} waiting", category, expected);
    }

    /// Poll the stats endpoint until exactly `expected` connections are registered
    async fn wait_for_connections(&self, expected: u64) {
        for _ in 0..100 {
            if self.stats().await["connections"] == json!(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("connections never reached {}", expected);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Helper struct wrapping one WebSocket client
struct TestClient {
    ws: WsStream,
    connection_id: String,
}

impl TestClient {
    /// Connect and consume the `connected` frame
    async fn connect(server: &TestServer) -> Self {
        let (ws, _) = connect_async(server.ws_url()).await.unwrap();
        let mut client = Self {
            ws,
            connection_id: String::new(),
        };
        let connected = client.recv().await;
        assert_eq!(connected["type"], "connected");
        client.connection_id = connected["connection_id"].as_str().unwrap().to_string();
        client
    }

    async fn send(&mut self, frame: Value) {
        self.ws
            .send(Message::Text(frame.to_string().into()))
            .await
            .unwrap();
    }

    async fn send_raw(&mut self, text: &str) {
        self.ws.send(Message::Text(text.into())).await.unwrap();
    }

    /// Receive the next JSON text frame
    async fn recv(&mut self) -> Value {
        loop {
            let msg = timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("stream closed")
                .unwrap();
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    /// Assert that no text frame arrives within a short window
    async fn assert_silent(&mut self) {
        if let Ok(Some(Ok(Message::Text(text)))) = timeout(SILENCE, self.ws.next()).await {
            panic!("unexpected frame: {}", text.as_str());
        }
    }

    async fn close(mut self) {
        self.ws.close(None).await.unwrap();
    }
}

/// Join `first` then `second` into `video` and return the shared room id
async fn pair(server: &TestServer, first: &mut TestClient, second: &mut TestClient) -> String {
    first.send(json!({"type": "join-category", "category": "video"})).await;
    server.wait_for_waiting("video", 1).await;
    second.send(json!({"type": "join-category", "category": "video"})).await;

    let second_ready = second.recv().await;
    let first_ready = first.recv().await;
    assert_eq!(second_ready["type"], "ready");
    assert_eq!(first_ready["type"], "ready");
    assert_eq!(first_ready["room"], second_ready["room"]);
    first_ready["room"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_empty_stats() {
    // テスト項目: ヘルスチェックと統計エンドポイントが JSON を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let health = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    let stats = server.stats().await;

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(stats["connections"], 0);
    assert_eq!(stats["rooms"], 0);
    assert_eq!(stats["waiting"], json!({"video": 0, "text": 0}));
    assert!(stats["generated_at"].is_string());
}

#[tokio::test]
async fn test_connected_frame_carries_unique_ids() {
    // テスト項目: 接続直後に connection_id を含む connected が届く
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let a = TestClient::connect(&server).await;
    let b = TestClient::connect(&server).await;

    // then (期待する結果):
    assert!(!a.connection_id.is_empty());
    assert_ne!(a.connection_id, b.connection_id);
    server.wait_for_connections(2).await;
}

#[tokio::test]
async fn test_two_joiners_are_paired_into_one_room() {
    // テスト項目: 同じカテゴリに 2 人が参加すると同じルームの ready が両者に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;
    let mut b = TestClient::connect(&server).await;

    // when (操作):
    let room = pair(&server, &mut a, &mut b).await;

    // then (期待する結果):
    assert!(room.starts_with(&format!("{}-{}-", b.connection_id, a.connection_id)));
    let stats = server.stats().await;
    assert_eq!(stats["rooms"], 1);
    assert_eq!(stats["waiting"]["video"], 0);
}

#[tokio::test]
async fn test_lone_joiner_waits_without_ready() {
    // テスト項目: 空のプールに参加したクライアントは待機し ready を受け取らない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;

    // when (操作):
    a.send(json!({"type": "join-category", "category": "video"})).await;

    // then (期待する結果):
    server.wait_for_waiting("video", 1).await;
    a.assert_silent().await;
}

#[tokio::test]
async fn test_categories_are_partitioned() {
    // テスト項目: 異なるカテゴリの待機者同士はペアにならない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;
    let mut b = TestClient::connect(&server).await;

    // when (操作):
    a.send(json!({"type": "join-category", "category": "video"})).await;
    b.send(json!({"type": "join-category", "category": "text"})).await;

    // then (期待する結果):
    server.wait_for_waiting("video", 1).await;
    server.wait_for_waiting("text", 1).await;
    a.assert_silent().await;
    b.assert_silent().await;
}

#[tokio::test]
async fn test_waiting_alias_uses_default_category() {
    // テスト項目: カテゴリ省略の waiting は既定カテゴリ（video）に参加する
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;

    // when (操作):
    a.send(json!({"type": "waiting"})).await;

    // then (期待する結果):
    server.wait_for_waiting("video", 1).await;
}

#[tokio::test]
async fn test_relay_reaches_only_the_other_member() {
    // テスト項目: ルーム内の中継はペアの相手にだけ届き、payload はそのまま転送される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;
    let mut b = TestClient::connect(&server).await;
    let mut outsider = TestClient::connect(&server).await;
    let room = pair(&server, &mut a, &mut b).await;
    let sdp = json!({"sdp": "v=0...", "type": "offer", "nested": [1, 2, {"x": null}]});

    // when (操作):
    a.send(json!({"type": "offer", "room": room, "payload": sdp})).await;
    b.send(json!({"type": "chat-message", "room": room, "payload": "hello"}))
        .await;

    // then (期待する結果):
    assert_eq!(b.recv().await, json!({"type": "offer", "payload": sdp}));
    assert_eq!(
        a.recv().await,
        json!({"type": "chat-message", "payload": "hello"})
    );
    outsider.assert_silent().await;
}

#[tokio::test]
async fn test_relay_from_outsider_is_ignored() {
    // テスト項目: ルームのメンバーでない送信者の中継は誰にも届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;
    let mut b = TestClient::connect(&server).await;
    let mut outsider = TestClient::connect(&server).await;
    let room = pair(&server, &mut a, &mut b).await;

    // when (操作):
    outsider
        .send(json!({"type": "ice-candidate", "room": room, "payload": {"candidate": "x"}}))
        .await;

    // then (期待する結果):
    a.assert_silent().await;
    b.assert_silent().await;
}

#[tokio::test]
async fn test_next_notifies_peer_and_rematches() {
    // テスト項目: ペア中の next で相手に peer-left が届き、要求者は次の待機者とペアになる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;
    let mut b = TestClient::connect(&server).await;
    let mut c = TestClient::connect(&server).await;
    let first_room = pair(&server, &mut a, &mut b).await;
    c.send(json!({"type": "join-category", "category": "video"})).await;
    server.wait_for_waiting("video", 1).await;

    // when (操作):
    b.send(json!({"type": "next"})).await;

    // then (期待する結果):
    assert_eq!(a.recv().await, json!({"type": "peer-left"}));
    let b_ready = b.recv().await;
    let c_ready = c.recv().await;
    assert_eq!(b_ready["type"], "ready");
    assert_eq!(b_ready["room"], c_ready["room"]);
    assert_ne!(b_ready["room"], json!(first_room));

    // 解散したルームへの中継は誰にも届かない
    a.send(json!({"type": "offer", "room": first_room, "payload": {}}))
        .await;
    b.assert_silent().await;
    c.assert_silent().await;
}

#[tokio::test]
async fn test_next_without_waiters_puts_requester_in_pool() {
    // テスト項目: 待機者がいない状態の next で要求者は待機状態になる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;
    let mut b = TestClient::connect(&server).await;
    pair(&server, &mut a, &mut b).await;

    // when (操作):
    a.send(json!({"type": "next", "category": "video"})).await;

    // then (期待する結果):
    assert_eq!(b.recv().await, json!({"type": "peer-left"}));
    server.wait_for_waiting("video", 1).await;
    let stats = server.stats().await;
    assert_eq!(stats["rooms"], 0);
    a.assert_silent().await;
}

#[tokio::test]
async fn test_disconnected_waiter_is_never_matched() {
    // テスト項目: 切断した待機者は後続の参加者とペアにならない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut ghost = TestClient::connect(&server).await;
    ghost
        .send(json!({"type": "join-category", "category": "video"}))
        .await;
    server.wait_for_waiting("video", 1).await;

    // when (操作):
    ghost.close().await;
    server.wait_for_waiting("video", 0).await;
    let mut a = TestClient::connect(&server).await;
    a.send(json!({"type": "join-category", "category": "video"})).await;

    // then (期待する結果):
    server.wait_for_waiting("video", 1).await;
    a.assert_silent().await;
}

#[tokio::test]
async fn test_disconnect_while_paired_notifies_peer() {
    // テスト項目: ペア中の切断で相手に peer-left が届き、ルームが解散する
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;
    let mut b = TestClient::connect(&server).await;
    pair(&server, &mut a, &mut b).await;

    // when (操作):
    a.close().await;

    // then (期待する結果):
    assert_eq!(b.recv().await, json!({"type": "peer-left"}));
    server.wait_for_connections(1).await;
    assert_eq!(server.stats().await["rooms"], 0);
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    // テスト項目: 解析できないフレームや未知のカテゴリは無視され、接続は使い続けられる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = TestClient::connect(&server).await;
    let mut b = TestClient::connect(&server).await;

    // when (操作):
    a.send_raw("not json").await;
    a.send(json!({"type": "teleport"})).await;
    a.send(json!({"type": "join-category", "category": "audio"})).await;
    a.send(json!({"type": "join-category", "category": "Bad Name!"})).await;

    // then (期待する結果):
    a.assert_silent().await;
    assert_eq!(server.stats().await["waiting"]["video"], 0);
    pair(&server, &mut a, &mut b).await;
}
