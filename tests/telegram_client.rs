use bytes::Bytes;
use horocast::messaging::{Messenger, MessagingError, TelegramClient};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header_exists, method, path},
};

fn client(server: &MockServer) -> TelegramClient {
    TelegramClient::new(&server.uri(), "123:abc", "@horoscopes").unwrap()
}

#[tokio::test]
async fn test_send_photo_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendPhoto"))
        .and(header_exists("content-type"))
        .and(body_string_contains("@horoscopes"))
        .and(body_string_contains("Подпись к фото"))
        .and(body_string_contains("filename=\"image.jpg\""))
        .and(body_string_contains("image/jpeg"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true,"result":{}}"#))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_photo(Bytes::from_static(b"fake-jpeg"), "Подпись к фото")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_photo_truncates_caption() {
    let server = MockServer::start().await;
    let kept = "к".repeat(1024);

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendPhoto"))
        .and(body_string_contains(format!("{kept}\r\n")))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let caption = format!("{kept}{}", "x".repeat(100));
    client(&server)
        .send_photo(Bytes::from_static(b"fake-jpeg"), &caption)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_message_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_string_contains("chat_id=%40horoscopes"))
        .and(body_string_contains("disable_web_page_preview=true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).send_message("Полный текст").await.unwrap();
}

#[tokio::test]
async fn test_api_error_carries_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        ))
        .mount(&server)
        .await;

    match client(&server).send_message("text").await {
        Err(MessagingError::Api { status, description }) => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ok_false_with_success_status_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"ok":false,"description":"Forbidden"}"#),
        )
        .mount(&server)
        .await;

    assert!(matches!(
        client(&server).send_message("text").await,
        Err(MessagingError::Api { .. })
    ));
}

#[tokio::test]
async fn test_transport_error_hides_token() {
    // Nothing listens on port 9
    let client = TelegramClient::new("http://127.0.0.1:9", "123:secret", "@c").unwrap();

    match client.send_message("text").await {
        Err(MessagingError::Transport(message)) => assert!(!message.contains("secret")),
        other => panic!("Expected transport error, got {other:?}"),
    }
}
