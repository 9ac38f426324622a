//! Wire tests for `HttpAskClient`: a one-shot HTTP/1.1 server on a random
//! loopback port captures the request and replies with a canned response.

use std::collections::HashMap;
use std::time::Duration;

use askbox_engine::{AskClient, AskError, ChatSession, HttpAskClient};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

#[derive(Debug)]
struct CapturedRequest {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Value,
}

/// Accept exactly one request, capture it, and answer with `status` and `body`.
async fn mock_server_once(
    status: u16,
    body: impl Into<String> + Send + 'static,
) -> (u16, tokio::sync::oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let body: String = body.into();
        let (stream, _) = listener.accept().await.expect("accept");
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).await.unwrap();
        let mut parts = request_line.trim().splitn(3, ' ');
        let method = parts.next().unwrap_or("").to_string();
        let path = parts.next().unwrap_or("").to_string();

        let mut headers = HashMap::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }
            if let Some((k, v)) = trimmed.split_once(": ") {
                let key = k.to_lowercase();
                if key == "content-length" {
                    content_length = v.parse().unwrap_or(0);
                }
                headers.insert(key, v.to_string());
            }
        }

        let mut body_bytes = vec![0u8; content_length];
        reader.read_exact(&mut body_bytes).await.unwrap();
        let request_body = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        let _ = tx.send(CapturedRequest {
            method,
            path,
            headers,
            body: request_body,
        });

        let response = format!(
            "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        write_half.write_all(response.as_bytes()).await.unwrap();
        write_half.shutdown().await.ok();
    });

    (port, rx)
}

fn client_for(port: u16) -> HttpAskClient {
    HttpAskClient::new(
        &format!("http://127.0.0.1:{port}/ask"),
        Some(Duration::from_secs(5)),
    )
    .unwrap()
}

#[tokio::test]
async fn posts_json_message_and_returns_reply() {
    let (port, captured) = mock_server_once(200, r#"{"reply":"**Hi**"}"#).await;

    let reply = client_for(port).ask("hello").await.unwrap();
    assert_eq!(reply, "**Hi**");

    let request = captured.await.unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/ask");
    assert_eq!(
        request.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(request.body, serde_json::json!({ "message": "hello" }));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    // The mock's status line says "Canned"; the error carries the standard phrase.
    let (port, _captured) = mock_server_once(500, r#"{"reply":"ignored"}"#).await;

    let err = client_for(port).ask("hello").await.unwrap_err();
    assert_eq!(err.to_string(), "Server error: 500 Internal Server Error");
    match err {
        AskError::Status { status, reason } => {
            assert_eq!(status, 500);
            assert_eq!(reason, "Internal Server Error");
            assert_ne!(reason, "Canned");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let (port, _captured) = mock_server_once(200, "<html>oops</html>").await;

    let err = client_for(port).ask("hello").await.unwrap_err();
    assert!(matches!(err, AskError::Decode(_)));
}

#[tokio::test]
async fn missing_reply_is_a_decode_error() {
    let (port, _captured) = mock_server_once(200, r#"{"answer":"hi"}"#).await;

    let err = client_for(port).ask("hello").await.unwrap_err();
    assert!(matches!(err, AskError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = client_for(port).ask("hello").await.unwrap_err();
    assert!(matches!(err, AskError::Transport(_)));
}

#[tokio::test]
async fn hung_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let client = HttpAskClient::new(
        &format!("http://127.0.0.1:{port}/ask"),
        Some(Duration::from_millis(200)),
    )
    .unwrap();

    let err = client.ask("hello").await.unwrap_err();
    assert!(matches!(err, AskError::Timeout));
}

#[tokio::test]
async fn session_round_trip_over_http() {
    let (port, _captured) =
        mock_server_once(200, r#"{"reply":"**Hi**\n1. first\n2. second"}"#).await;
    let client = client_for(port);

    let mut session = ChatSession::default();
    session.open();
    let pending = session.submit("hello").unwrap();
    let result = askbox_engine::dispatch(&client, &pending).await;
    assert!(session.finish(pending.id, result));

    let html = session.transcript_html();
    assert!(html.ends_with(
        r#"<div class="message bot-message"><b>Hi</b><br><ol><br><li>first</li><br><li>second</li><br></ol></div>"#
    ));
    assert!(!session.is_busy());
}

#[tokio::test]
async fn session_shows_fallback_on_server_error() {
    let (port, _captured) = mock_server_once(500, "{}").await;
    let client = client_for(port);

    let mut session = ChatSession::default();
    session.open();
    let pending = session.submit("hello").unwrap();
    let result = askbox_engine::dispatch(&client, &pending).await;
    session.finish(pending.id, result);

    let entries = session.transcript().entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].css_class(), "bot-message");
    assert!(!session.transcript().has_typing());
    assert!(!session.is_busy());
    assert!(session
        .transcript_html()
        .ends_with("Sorry, an error occurred. Please try again later.</div>"));
}
