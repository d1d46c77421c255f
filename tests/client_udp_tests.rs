// UDP client loop tests
//
// Runs client::run against local sockets:
// - a server port with nothing behind it must not stop the client
// - the client re-joins once a server shows up on that port, then plays

use netsnake_ai::client;
use netsnake_ai::config::Config;
use std::time::Duration;
use tokio::net::UdpSocket;

/// A localhost port that nothing listens on right now
fn closed_port() -> u16 {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").expect("bind throwaway socket");
    socket.local_addr().expect("local addr").port()
}

fn client_config(server_port: u16, source_port_base: u16) -> Config {
    let mut config = Config::default_hardcoded();
    config.client.server_port = server_port;
    config.client.source_port_base = source_port_base;
    config.client.source_port_span = 200;
    config.client.rejoin_interval_ms = 50;
    config.search.rng_seed = Some(9);
    config
}

#[tokio::test]
async fn test_client_survives_refused_server() {
    let config = client_config(closed_port(), 21300);

    let outcome = tokio::time::timeout(Duration::from_millis(800), client::run(config)).await;
    assert!(
        outcome.is_err(),
        "client should keep waiting for the server, returned {:?}",
        outcome.map(|r| r.map_err(|e| e.to_string()))
    );
}

#[tokio::test]
async fn test_client_rejoins_when_server_comes_up() {
    let port = closed_port();
    let config = client_config(port, 21600);

    let fake_server = async {
        // Let a few joins bounce off the closed port first
        tokio::time::sleep(Duration::from_millis(300)).await;
        let server = UdpSocket::bind(("127.0.0.1", port))
            .await
            .expect("bind server socket");
        let mut buf = [0u8; 64];

        let (len, client_addr) =
            tokio::time::timeout(Duration::from_secs(3), server.recv_from(&mut buf))
                .await
                .expect("join should arrive once the server is up")
                .expect("recv join");
        assert_eq!(&buf[..len], b"s");

        // Heading up with the apple to the right: the client turns right
        server
            .send_to(b"0_1#10,5#a|0|5,5_U_d", client_addr)
            .await
            .expect("send state");
        let (len, _) = tokio::time::timeout(Duration::from_secs(3), server.recv_from(&mut buf))
            .await
            .expect("move should follow the state")
            .expect("recv move");
        assert_eq!(&buf[..len], b"mr");
    };

    tokio::select! {
        result = client::run(config) => {
            panic!("client stopped early: {:?}", result.map_err(|e| e.to_string()))
        }
        _ = fake_server => {}
    }
}
