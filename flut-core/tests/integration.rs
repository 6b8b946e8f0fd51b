//! Integration tests — full viewer lifecycle against a real WebSocket
//! server on localhost.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};

use flut_core::frame::encode_rgba64;
use flut_core::{SessionConfig, ViewerClient, WatchSink};

// ── Helpers ──────────────────────────────────────────────────────

/// Bind a listener on an OS-assigned port and return it with its url.
async fn ephemeral_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, format!("ws://{addr}"))
}

/// Accept one connection, insisting on the `pixelflut` subprotocol.
async fn accept_viewer(listener: &TcpListener) -> WebSocketStream<tokio::net::TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    accept_hdr_async(stream, |req: &Request, mut resp: Response| {
        let offered = req
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok());
        if offered != Some("pixelflut") {
            let mut err = ErrorResponse::new(Some("pixelflut subprotocol required".into()));
            *err.status_mut() = tokio_tungstenite::tungstenite::http::StatusCode::BAD_REQUEST;
            return Err(err);
        }
        resp.headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static("pixelflut"));
        Ok(resp)
    })
    .await
    .unwrap()
}

fn client_config(url: &str) -> SessionConfig {
    SessionConfig {
        update_frequency: 50.0,
        ..SessionConfig::new(url)
    }
}

// ── Full lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_frames_render_until_server_closes() {
    let (listener, url) = ephemeral_listener().await;

    // Serves a 3x2 canvas; frame n is filled with byte n. Closes after
    // the third frame.
    let server = tokio::spawn(async move {
        let mut ws = accept_viewer(&listener).await;
        let mut received = Vec::new();
        let mut served = 0u8;

        while let Some(Ok(Message::Text(text))) = ws.next().await {
            received.push(text.as_str().to_owned());
            match text.as_str() {
                "SIZE" => ws.send(Message::Text("SIZE 3 2\n".into())).await.unwrap(),
                "STATE rgba64" => {
                    served += 1;
                    let payload = encode_rgba64(&[served; 24]);
                    let reply = format!("STATE rgba64 {payload}\n");
                    ws.send(Message::Text(reply.into())).await.unwrap();
                    if served == 3 {
                        break;
                    }
                }
                other => panic!("unexpected request {other:?}"),
            }
        }

        ws.close(None).await.unwrap();
        while ws.next().await.is_some() {}
        received
    });

    let sink = WatchSink::new();
    let frames = sink.frame_receiver();
    let stats = sink.stats_receiver();
    let mut client = ViewerClient::new(client_config(&url), sink).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(10), client.run())
        .await
        .expect("timeout");
    assert_ok!(result);

    let received = server.await.unwrap();
    assert_eq!(received[0], "SIZE");
    assert_eq!(received[1..], ["STATE rgba64"; 3]);

    let last = frames.borrow().clone();
    assert_eq!((last.width, last.height), (3, 2));
    assert_eq!(last.data, vec![3u8; 24]);

    let stats = stats.borrow().clone();
    assert_eq!(stats.total_frames, 3);
    assert_eq!(stats.total_bytes, 72);
    assert_eq!((stats.width, stats.height), (3, 2));

    // Close resets the session.
    assert!(!client.session().is_connected());
    assert_eq!(client.session().dimensions(), None);
}

// ── Flow control ─────────────────────────────────────────────────

#[tokio::test]
async fn test_unanswered_snapshot_blocks_further_requests() {
    let (listener, url) = ephemeral_listener().await;

    // Answers SIZE but never STATE; records everything until the
    // client goes away.
    let server = tokio::spawn(async move {
        let mut ws = accept_viewer(&listener).await;
        let mut received = Vec::new();
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                if text.as_str() == "SIZE" {
                    ws.send(Message::Text("SIZE 10 10".into())).await.unwrap();
                }
                received.push(text.as_str().to_owned());
            }
        }
        received
    });

    let mut client = ViewerClient::new(client_config(&url), WatchSink::new()).unwrap();
    let stop = client.stop_handle();

    let run = tokio::spawn(async move {
        let result = client.run().await;
        (result, client)
    });

    // Roughly fifteen poll periods at 50 Hz.
    tokio::time::sleep(Duration::from_millis(300)).await;
    stop.stop();

    let (result, client) = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("timeout")
        .unwrap();
    assert_ok!(result);
    assert!(!client.session().is_connected());

    let received = server.await.unwrap();
    assert_eq!(received, ["SIZE", "STATE rgba64"]);
}

// ── Protocol errors keep the session alive ───────────────────────

#[tokio::test]
async fn test_bad_server_messages_are_survived() {
    let (listener, url) = ephemeral_listener().await;

    let server = tokio::spawn(async move {
        let mut ws = accept_viewer(&listener).await;
        let mut state_requests = 0;
        while let Some(Ok(Message::Text(text))) = ws.next().await {
            match text.as_str() {
                "SIZE" => {
                    ws.send(Message::Text("HELLO there".into())).await.unwrap();
                    ws.send(Message::Text("SIZE 1 banana".into())).await.unwrap();
                    ws.send(Message::Text("size 1 1".into())).await.unwrap();
                }
                _ => {
                    state_requests += 1;
                    let reply = match state_requests {
                        1 => "STATE png AAAA".to_string(),
                        2 => "STATE rgba64 AAAA".to_string(),
                        _ => format!("STATE RGBA64 {}", encode_rgba64(&[7, 7, 7, 7])),
                    };
                    ws.send(Message::Text(reply.into())).await.unwrap();
                    if state_requests == 3 {
                        break;
                    }
                }
            }
        }
        ws.close(None).await.unwrap();
        while ws.next().await.is_some() {}
    });

    let sink = WatchSink::new();
    let frames = sink.frame_receiver();
    let mut client = ViewerClient::new(client_config(&url), sink).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(10), client.run())
        .await
        .expect("timeout");
    assert_ok!(result);
    server.await.unwrap();

    assert_eq!(frames.borrow().data, vec![7u8; 4]);
}
