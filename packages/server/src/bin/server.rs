//! Pairing signaling server.
//!
//! Pairs anonymous clients per category and relays negotiation messages
//! between the two members of each room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin deai-server
//! cargo run --bin deai-server -- --host 0.0.0.0 --port 3000 -c video -c text
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use deai_server::{
    domain::{Category, Matchmaker, SessionRouter},
    infrastructure::message_pusher::WebSocketMessagePusher,
    ui::Server,
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetStatsUseCase, JoinCategoryUseCase,
        NextPeerUseCase, RelaySignalUseCase,
    },
};
use deai_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "deai-server")]
#[command(about = "Signaling server pairing strangers for video or text chat", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3000")]
    port: u16,

    /// Accepted chat categories; the first one is used when a join omits it
    #[arg(short = 'c', long = "category", default_values = ["video", "text"])]
    categories: Vec<Category>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Matchmaker and SessionRouter
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create the SessionRouter (in-memory sessions, rooms and waiting pools)
    let matchmaker = match Matchmaker::new(args.categories) {
        Ok(matchmaker) => matchmaker,
        Err(e) => {
            tracing::error!("Invalid category configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Categories: {} (default: {})",
        matchmaker
            .categories()
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        matchmaker.default_category()
    );
    let router = Arc::new(Mutex::new(SessionRouter::new(matchmaker)));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

    // 3. Create UseCases
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        router.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let join_category_usecase = Arc::new(JoinCategoryUseCase::new(
        router.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let next_peer_usecase = Arc::new(NextPeerUseCase::new(
        router.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let relay_signal_usecase = Arc::new(RelaySignalUseCase::new(
        router.clone(),
        message_pusher.clone(),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(
        router.clone(),
        message_pusher.clone(),
    ));
    let get_stats_usecase = Arc::new(GetStatsUseCase::new(router));

    // 4. Create and run the server
    let server = Server::new(
        connect_client_usecase,
        join_category_usecase,
        next_peer_usecase,
        relay_signal_usecase,
        disconnect_client_usecase,
        get_stats_usecase,
        clock,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
