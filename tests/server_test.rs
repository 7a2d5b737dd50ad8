//! End-to-end tests over real TCP connections.

use collecto::{GameClient, GameResult, GameServer, Request, Response, ServerConfig};
use collecto_board::{GreedyStrategy, NaiveStrategy};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Starts a server on an ephemeral port and returns its address.
async fn start_server() -> (String, collecto::SessionCoordinator) {
    let config = ServerConfig::default()
        .with_port(0u16)
        .with_server_name("loopback")
        .with_seed(2024u64);
    let server = GameServer::new(config);
    let coordinator = server.coordinator().clone();
    let listener = server.bind().await.expect("Failed to bind");
    let address = listener
        .local_addr()
        .expect("Failed to read local address")
        .to_string();
    tokio::spawn(server.serve(listener));
    (address, coordinator)
}

async fn wait_until_queued(coordinator: &collecto::SessionCoordinator, name: &str) {
    for _ in 0..200 {
        if coordinator.queued().await.iter().any(|queued| queued == name) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{name} never reached the queue");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_raw_handshake() {
    let (address, _coordinator) = start_server().await;
    let stream = TcpStream::connect(&address).await.expect("Failed to connect");
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer
        .write_all(b"HELLO~raw test\nLOGIN~raw\nLIST\nNONSENSE\n")
        .await
        .expect("Failed to write");

    let mut replies = Vec::new();
    for _ in 0..4 {
        replies.push(
            lines
                .next_line()
                .await
                .expect("Failed to read")
                .expect("Server closed early"),
        );
    }
    assert_eq!(replies[0], "HELLO~loopback");
    assert_eq!(replies[1], "LOGIN");
    assert_eq!(replies[2], "LIST~raw");
    assert!(replies[3].starts_with("ERROR~"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_duplicate_name_is_refused() {
    let (address, _coordinator) = start_server().await;
    let _ada = GameClient::connect(&address, "ada")
        .await
        .expect("Failed to log in");
    let err = GameClient::connect(&address, "ada")
        .await
        .expect_err("name is taken");
    assert!(err.message.contains("already taken"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_bots_play_a_full_match() {
    let (address, coordinator) = start_server().await;

    let mut ada = GameClient::connect(&address, "ada")
        .await
        .expect("Failed to log in");
    let mut bob = GameClient::connect(&address, "bob")
        .await
        .expect("Failed to log in");
    assert_eq!(
        ada.list().await.expect("Failed to list"),
        vec!["ada".to_string(), "bob".to_string()]
    );

    let ada_task = tokio::spawn(async move {
        let mut strategy = GreedyStrategy::new("ada");
        ada.play_match(&mut strategy).await
    });
    wait_until_queued(&coordinator, "ada").await;
    let bob_task = tokio::spawn(async move {
        let mut strategy = NaiveStrategy::seeded("bob", 5);
        bob.play_match(&mut strategy).await
    });

    let ada_report = ada_task
        .await
        .expect("ada task panicked")
        .expect("ada's match failed");
    let bob_report = bob_task
        .await
        .expect("bob task panicked")
        .expect("bob's match failed");

    assert!(*ada_report.moved_first());
    assert!(!*bob_report.moved_first());
    assert_eq!(ada_report.opponent(), "bob");
    assert_eq!(bob_report.opponent(), "ada");
    assert_eq!(ada_report.result(), bob_report.result());
    assert_eq!(ada_report.turns(), bob_report.turns());
    assert!(*ada_report.turns() > 0);
    assert_eq!(ada_report.score(), bob_report.opponent_score());
    assert_eq!(bob_report.score(), ada_report.opponent_score());

    let expected = match ada_report.score().cmp(ada_report.opponent_score()) {
        std::cmp::Ordering::Greater => GameResult::Victory("ada".to_string()),
        std::cmp::Ordering::Less => GameResult::Victory("bob".to_string()),
        std::cmp::Ordering::Equal => GameResult::Draw,
    };
    assert_eq!(ada_report.result(), &expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dropped_connection_forfeits_the_match() {
    let (address, coordinator) = start_server().await;

    let mut ada = GameClient::connect(&address, "ada")
        .await
        .expect("Failed to log in");
    let mut bob = GameClient::connect(&address, "bob")
        .await
        .expect("Failed to log in");

    ada.send(&Request::Queue).await.expect("Failed to queue");
    wait_until_queued(&coordinator, "ada").await;
    bob.send(&Request::Queue).await.expect("Failed to queue");

    for client in [&mut ada, &mut bob] {
        match client.receive().await.expect("Failed to receive") {
            Response::NewGame { first, .. } => assert_eq!(first, "ada"),
            other => panic!("expected NEWGAME, got {other}"),
        }
    }

    drop(ada);
    assert_eq!(
        bob.receive().await.expect("Failed to receive"),
        Response::GameOver(GameResult::Disconnect("bob".to_string()))
    );
}

#[tokio::test]
async fn test_bots_play_on_a_current_thread_runtime() {
    let (address, coordinator) = start_server().await;

    let mut ada = GameClient::connect(&address, "ada")
        .await
        .expect("Failed to log in");
    let mut bob = GameClient::connect(&address, "bob")
        .await
        .expect("Failed to log in");

    let ada_task = tokio::spawn(async move {
        let mut strategy = GreedyStrategy::new("ada");
        ada.play_match(&mut strategy).await
    });
    wait_until_queued(&coordinator, "ada").await;
    let bob_task = tokio::spawn(async move {
        let mut strategy = GreedyStrategy::new("bob");
        bob.play_match(&mut strategy).await
    });

    let ada_report = ada_task
        .await
        .expect("ada task panicked")
        .expect("ada's match failed");
    let bob_report = bob_task
        .await
        .expect("bob task panicked")
        .expect("bob's match failed");

    assert_eq!(ada_report.result(), bob_report.result());
    assert_eq!(ada_report.turns(), bob_report.turns());
    assert_eq!(ada_report.score(), bob_report.opponent_score());
}
