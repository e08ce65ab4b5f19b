//! Integration tests for the WebSocket transport.
//!
//! These spin up a real WebSocket server and client to verify that frames
//! actually flow over the network, including the property the broker relies
//! on: sending to a connection while its reader is blocked in `recv`.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tandem_transport::{Connection, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds a transport on an ephemeral port, returning it with its address.
    async fn bind_transport() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport
            .local_addr()
            .expect("should have local addr")
            .to_string();
        (transport, addr)
    }

    async fn connect_client(addr: &str) -> ClientWs {
        let url = format!("ws://{addr}");
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind_transport().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);

        // Server sends, client receives.
        server_conn
            .send(b"hello from server")
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"hello from server");

        // Client sends, server receives.
        client_ws
            .send(Message::Binary(b"hello from client".to_vec().into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"hello from client");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_text_frames_are_received_as_bytes() {
        // The JSON protocol may arrive as text frames from browser clients.
        let (mut transport, addr) = bind_transport().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws
            .send(Message::Text(r#"{"type":"LeaveRoom"}"#.into()))
            .await
            .unwrap();

        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received, br#"{"type":"LeaveRoom"}"#);
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_is_parked() {
        // The broker pushes peer notices while the reader task is blocked
        // in recv. The split sink/stream halves must allow this.
        let (mut transport, addr) = bind_transport().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = Arc::new(server_handle.await.unwrap());

        // Park a reader; the client never sends, so it stays parked.
        let reader_conn = Arc::clone(&server_conn);
        let reader = tokio::spawn(async move { reader_conn.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The send must complete even though recv holds the stream half.
        tokio::time::timeout(
            Duration::from_secs(1),
            server_conn.send(b"pushed while reading"),
        )
        .await
        .expect("send should not be blocked by a parked recv")
        .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"pushed while reading");

        // Unpark the reader by closing the client.
        client_ws.send(Message::Close(None)).await.unwrap();
        let parked = reader.await.unwrap().expect("recv should not error");
        assert!(parked.is_none());
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind_transport().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_unique() {
        let (mut transport, addr) = bind_transport().await;

        let server_handle = tokio::spawn(async move {
            let a = transport.accept().await.expect("accept first");
            let b = transport.accept().await.expect("accept second");
            (a, b)
        });

        let _c1 = connect_client(&addr).await;
        let _c2 = connect_client(&addr).await;

        let (a, b) = server_handle.await.unwrap();
        assert_ne!(a.id(), b.id());
    }
}
