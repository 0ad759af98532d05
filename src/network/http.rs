use reqwest::Client;

use crate::common::{ChatMessage, OutgoingMessage};

use super::error::NetworkError;

/// Client for the message store's `/messages` endpoint.
#[derive(Clone)]
pub struct HistoryClient {
    client: Client,
    messages_url: String,
}

impl HistoryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            messages_url: format!("{}/messages", base_url.trim_end_matches('/')),
        }
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    pub async fn fetch_history(&self) -> Result<Vec<ChatMessage>, NetworkError> {
        let response = self.client.get(&self.messages_url).send().await?;
        let response = self.check_status(response)?;
        Ok(response.json::<Vec<ChatMessage>>().await?)
    }

    /// Returns the stored message, including its server-assigned id.
    pub async fn post_message(
        &self,
        message: &OutgoingMessage,
    ) -> Result<ChatMessage, NetworkError> {
        let response = self
            .client
            .post(&self.messages_url)
            .json(message)
            .send()
            .await?;
        let response = self.check_status(response)?;
        Ok(response.json::<ChatMessage>().await?)
    }

    fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, NetworkError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(NetworkError::Status {
                status,
                url: self.messages_url.clone(),
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// A one-route HTTP responder. Every request gets `status` and `body`;
    /// the raw request text (head and body) is forwarded on the channel.
    pub async fn serve(
        status: u16,
        body: &'static str,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let tx = tx.clone();
                tokio::spawn(async move {
                    let request = read_request(&mut socket).await;
                    let _ = tx.send(request);
                    let response = format!(
                        "HTTP/1.1 {status} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{addr}"), rx)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MessageId;

    #[test]
    fn messages_url_ignores_trailing_slash() {
        assert_eq!(
            HistoryClient::new("http://host:1/").messages_url(),
            "http://host:1/messages"
        );
        assert_eq!(
            HistoryClient::new("http://host:1").messages_url(),
            "http://host:1/messages"
        );
    }

    #[tokio::test]
    async fn fetch_history_returns_server_order() {
        let (url, mut requests) = test_server::serve(
            200,
            r#"[{"id":1,"text":"hi","sender":"User7","timestamp":100},{"id":2,"text":"yo","sender":"User9"}]"#,
        )
        .await;

        let history = HistoryClient::new(&url).fetch_history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, MessageId::Number(1));
        assert_eq!(history[1].text, "yo");

        let request = requests.recv().await.unwrap();
        assert!(request.starts_with("GET /messages "));
    }

    #[tokio::test]
    async fn post_message_sends_payload_and_parses_echo() {
        let (url, mut requests) = test_server::serve(
            201,
            r#"{"id":"srv-1","text":"hello","sender":"User3","timestamp":5}"#,
        )
        .await;

        let outgoing = OutgoingMessage::new("hello", "User3");
        let echoed = HistoryClient::new(&url)
            .post_message(&outgoing)
            .await
            .unwrap();
        assert_eq!(echoed.id, MessageId::from("srv-1"));

        let request = requests.recv().await.unwrap();
        assert!(request.starts_with("POST /messages "));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let sent: OutgoingMessage = serde_json::from_str(body).unwrap();
        assert_eq!(sent, outgoing);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let (url, _requests) = test_server::serve(500, r#"{"error":"boom"}"#).await;
        let err = HistoryClient::new(&url).fetch_history().await.unwrap_err();
        assert!(matches!(err, NetworkError::Status { status, .. } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HistoryClient::new(&format!("http://{addr}"))
            .fetch_history()
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::Http(_)));
    }
}
