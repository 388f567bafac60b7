use aivi_core::context::{ContextDocument, ConversationMessage};
use aivi_interaction::{ChatCompletion, GatewayError, OpenAIChatClient};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves one canned HTTP response and returns the raw request it received.
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });
    (base_url, handle)
}

fn request() -> ContextDocument {
    ContextDocument {
        model: "gpt-4o".into(),
        max_tokens: 32,
        messages: vec![
            ConversationMessage::system("Fix spelling."),
            ConversationMessage::user("Teh cat"),
        ],
    }
}

#[tokio::test]
async fn test_posts_document_with_bearer_auth() {
    let (base_url, server) = serve_once(
        "HTTP/1.1 200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"The cat"}}]}"#,
    )
    .await;
    let client = OpenAIChatClient::new("sk-test", base_url, Duration::from_secs(5)).unwrap();

    let reply = client.complete(&request()).await.unwrap();
    assert_eq!(reply, "The cat");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1/chat/completions"));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
    let sent: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(sent["model"], "gpt-4o");
    assert_eq!(sent["max_tokens"], 32);
    assert_eq!(sent["messages"][1]["role"], "user");
    assert_eq!(sent.as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_http_error_is_reported() {
    let (base_url, server) = serve_once(
        "HTTP/1.1 503 Service Unavailable",
        r#"{"error":{"message":"overloaded"}}"#,
    )
    .await;
    let client = OpenAIChatClient::new("sk-test", base_url, Duration::from_secs(5)).unwrap();

    let err = client.complete(&request()).await.unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, GatewayError::Http { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let (base_url, server) = serve_once("HTTP/1.1 200 OK", "not json").await;
    let client = OpenAIChatClient::new("sk-test", base_url, Duration::from_secs(5)).unwrap();

    let err = client.complete(&request()).await.unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, GatewayError::Malformed(_)));
}
