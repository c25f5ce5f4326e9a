//! Integration tests for the WebSocket client connection.
//!
//! These tests spin up a real `tokio-tungstenite` server on a random local
//! port and drive [`WebSocketConnection`] against it.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tenhou_transport::{
        ConnectOptions, Connection, TransportError, WebSocketConnection,
    };
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::tungstenite::handshake::server::{
        ErrorResponse, Request, Response,
    };
    use tokio_tungstenite::tungstenite::Message;

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener on a random port and accepts exactly one client.
    async fn spawn_server() -> (String, tokio::task::JoinHandle<ServerWs>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("should accept");
            tokio_tungstenite::accept_async(stream)
                .await
                .expect("handshake")
        });
        (format!("ws://{addr}"), handle)
    }

    fn options(url: &str) -> ConnectOptions {
        ConnectOptions {
            recv_timeout: Duration::from_millis(100),
            ..ConnectOptions::new(url)
        }
    }

    #[tokio::test]
    async fn test_send_and_receive_lines() {
        let (url, server) = spawn_server().await;
        let conn = WebSocketConnection::open(&options(&url))
            .await
            .expect("should connect");
        let mut server_ws = server.await.expect("server task");

        // --- Server pushes, client receives ---
        server_ws
            .send(Message::Text(r#"{"tag":"HELO","uname":"NoName"}"#.into()))
            .await
            .unwrap();
        let line = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have a line");
        assert_eq!(line, r#"{"tag":"HELO","uname":"NoName"}"#);

        // --- Client sends, server receives a text frame ---
        conn.send(r#"{"tag":"GOK"}"#).await.expect("send");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"tag":"GOK"}"#);

        conn.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_timeout() {
        let (url, server) = spawn_server().await;
        let conn = WebSocketConnection::open(&options(&url)).await.unwrap();
        let _server_ws = server.await.unwrap();

        // Nothing is pushed, so the receive timeout elapses.
        let result = conn.recv().await.expect("timeout is not an error");
        assert!(result.is_none());

        // The connection is still usable afterwards.
        assert!(conn.send("<Z/>").await.is_ok());
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_blocks_further_io() {
        let (url, server) = spawn_server().await;
        let conn = WebSocketConnection::open(&options(&url)).await.unwrap();
        let _server_ws = server.await.unwrap();

        conn.close().await.expect("first close");
        conn.close().await.expect("second close is a no-op");
        assert!(conn.is_closed());

        let err = conn.send("<Z/>").await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed(_)));
    }

    #[tokio::test]
    async fn test_server_close_surfaces_as_connection_closed() {
        let (url, server) = spawn_server().await;
        let conn = WebSocketConnection::open(&options(&url)).await.unwrap();
        let mut server_ws = server.await.unwrap();

        server_ws.close(None).await.unwrap();

        let err = conn.recv().await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed(_)));
        assert!(conn.is_closed());
    }

    #[tokio::test]
    async fn test_host_and_origin_headers_are_sent() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<(String, String)>();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = move |req: &Request, resp: Response| {
                let header = |name: &str| {
                    req.headers()
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_owned()
                };
                let _ = tx.send((header("host"), header("origin")));
                Ok::<Response, ErrorResponse>(resp)
            };
            tokio_tungstenite::accept_hdr_async(stream, callback)
                .await
                .unwrap()
        });

        let conn = WebSocketConnection::open(&ConnectOptions {
            host: "b-ww.mjv.jp".into(),
            origin: "https://tenhou.net".into(),
            ..options(&format!("ws://{addr}"))
        })
        .await
        .expect("should connect");

        let (host, origin) = rx.await.expect("callback ran");
        assert_eq!(host, "b-ww.mjv.jp");
        assert_eq!(origin, "https://tenhou.net");

        let _server_ws = server.await.unwrap();
        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_fails_when_nothing_listens() {
        // Bind then drop to get a port that is very likely closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result =
            WebSocketConnection::open(&options(&format!("ws://{addr}"))).await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_url() {
        let result = WebSocketConnection::open(&options("not a url")).await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectFailed { .. })
        ));
    }
}
