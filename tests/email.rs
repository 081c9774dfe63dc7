use httpmock::prelude::*;
use postmark_client::{Attachment, Client, Email, EmailResult, Error};
use serde_json::json;

const TOKEN: &str = "server-token";

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.base_url())
        .server_token(TOKEN)
        .build()
        .unwrap()
}

#[tokio::test]
async fn send_posts_to_email_endpoint_with_headers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/email")
                .header("Content-Type", "application/json")
                .header("Accept", "application/json")
                .header("X-Postmark-Server-Token", TOKEN)
                .json_body(json!({}));
            then.status(200).body(
                r#"{
                    "To": "receiver@example.com",
                    "MessageID": "MessageID"
                }"#,
            );
        })
        .await;

    let client = client_for(&server);
    let (result, response) = client.email().send(&Email::new()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.url.path(), "/email");
    assert_eq!(
        result,
        EmailResult {
            to: "receiver@example.com".to_string(),
            message_id: "MessageID".to_string(),
            ..EmailResult::default()
        }
    );
    assert!(result.submitted_at.is_none());
}

#[tokio::test]
async fn send_encodes_full_email() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/email").json_body(json!({
                "From": "sender@example.com",
                "To": "receiver@example.com",
                "Subject": "Subject",
                "TextBody": "Body",
                "TrackOpens": true,
                "Attachments": [{
                    "Name": "readme.txt",
                    "Content": "Q29udGVudA==",
                    "ContentType": "text/plain"
                }]
            }));
            then.status(200).json_body(json!({
                "To": "receiver@example.com",
                "SubmittedAt": "2014-02-17T07:25:01.4178645-05:00",
                "MessageID": "0a129aee-e1cd-480d-b08d-4f48548ff48d",
                "ErrorCode": 0,
                "Message": "OK"
            }));
        })
        .await;

    let email = Email::new()
        .from("sender@example.com")
        .to("receiver@example.com")
        .subject("Subject")
        .text_body("Body")
        .track_opens(true)
        .attachment(Attachment::new("readme.txt", "Content", "text/plain"));

    let (result, _) = client_for(&server).email().send(&email).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.message_id, "0a129aee-e1cd-480d-b08d-4f48548ff48d");
    assert!(result.submitted_at.is_some());
}

#[tokio::test]
async fn send_returns_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/email");
            then.status(422).body(
                r#"{
                    "ErrorCode": 0,
                    "Message": "Message"
                }"#,
            );
        })
        .await;

    let err = client_for(&server).email().send(&Email::new()).await.unwrap_err();

    match &err {
        Error::Api(api) => {
            assert_eq!(api.error_code, 0);
            assert_eq!(api.message, "Message");
            assert_eq!(api.response.status.as_u16(), 422);
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(err.to_string(), r#"API error 0 "Message""#);
    assert!(err.response().is_some());
}

#[tokio::test]
async fn send_reports_unexpected_payload_as_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/email");
            then.status(200).body("[]");
        })
        .await;

    let err = client_for(&server).email().send(&Email::new()).await.unwrap_err();

    match err {
        Error::Decode { response, .. } => assert_eq!(response.text(), "[]"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn send_batch_preserves_result_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/email/batch")
                .header("Content-Type", "application/json")
                .header("Accept", "application/json")
                .header("X-Postmark-Server-Token", TOKEN)
                .json_body(json!([
                    { "To": "receiver1@example.com" },
                    { "To": "receiver2@example.com" }
                ]));
            then.status(200).body(
                r#"[{
                    "To": "receiver1@example.com",
                    "MessageID": "MessageID1"
                }, {
                    "To": "receiver2@example.com",
                    "MessageID": "MessageID2"
                }]"#,
            );
        })
        .await;

    let emails = vec![
        Email::new().to("receiver1@example.com"),
        Email::new().to("receiver2@example.com"),
    ];
    let (results, response) = client_for(&server)
        .email()
        .send_batch(&emails)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.url.path(), "/email/batch");
    assert_eq!(
        results,
        vec![
            EmailResult {
                to: "receiver1@example.com".to_string(),
                message_id: "MessageID1".to_string(),
                ..EmailResult::default()
            },
            EmailResult {
                to: "receiver2@example.com".to_string(),
                message_id: "MessageID2".to_string(),
                ..EmailResult::default()
            },
        ]
    );
}

#[tokio::test]
async fn send_batch_surfaces_per_item_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/email/batch").json_body(json!([]));
            then.status(200).json_body(json!([
                {
                    "ErrorCode": 406,
                    "Message": "You tried to send to a recipient that has been marked as inactive."
                }
            ]));
        })
        .await;

    let (results, _) = client_for(&server).email().send_batch(&[]).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].error_code, 406);
    assert!(results[0].to.is_empty());
}
