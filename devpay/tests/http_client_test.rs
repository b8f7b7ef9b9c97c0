//! End-to-end tests of the client over real HTTP against a local mock server.

use devpay::{Client, DevPayError, Params, error::RemoteErrorKind};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const KEY: &str = "sk_test_integration";

fn client_for(server: &ServerGuard, raise_errors: bool) -> Client {
    Client::builder(KEY)
        .api_url(format!("{}/v1", server.url()))
        .raise_errors(raise_errors)
        .build()
        .expect("client should build for loopback URL")
}

fn card_charge() -> Params {
    Params::new()
        .set("amount", 2000)
        .set("currency", "usd")
        .set("card", json!({"number": "4242424242424242", "exp_month": 10, "exp_year": 2031}))
}

#[tokio::test]
async fn test_execute_charge_sends_flattened_form() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_header("user-agent", Matcher::Regex("^devpay-rust/".to_owned()))
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("method".to_owned(), "execute_charge".to_owned()),
            Matcher::UrlEncoded("key".to_owned(), KEY.to_owned()),
            Matcher::UrlEncoded("client[type]".to_owned(), "binding".to_owned()),
            Matcher::UrlEncoded("client[language]".to_owned(), "rust".to_owned()),
            Matcher::UrlEncoded("amount".to_owned(), "2000".to_owned()),
            Matcher::UrlEncoded("currency".to_owned(), "usd".to_owned()),
            Matcher::UrlEncoded("card[number]".to_owned(), "4242424242424242".to_owned()),
            Matcher::UrlEncoded("card[exp_month]".to_owned(), "10".to_owned()),
            Matcher::UrlEncoded("card[exp_year]".to_owned(), "2031".to_owned()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "ch_1", "amount": 2000, "currency": "usd"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, true);
    let response = client.execute(card_charge()).await.expect("charge should succeed");

    assert_eq!(response.id(), Some("ch_1"));
    assert_eq!(response.get_i64("amount"), Some(2000));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_card_error_is_raised() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1")
        .with_status(402)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"type": "card_error", "message": "Your card was declined."}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, true);
    let err = client.execute(card_charge()).await.unwrap_err();

    assert!(err.is_card_error());
    assert_eq!(err.message(), "Your card was declined.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_kept_in_response_when_not_raising() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1")
        .with_status(400)
        .with_body(
            r#"{"error": {"type": "invalid_request_error", "message": "No such charge", "param": "id"}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server, false);
    let response = client
        .retrieve(Params::new().set("id", "ch_missing"))
        .await
        .expect("errors are returned in the response");

    let remote = response.error().expect("response should carry the error");
    assert_eq!(remote.kind, RemoteErrorKind::InvalidRequestError);
    assert_eq!(remote.param.as_deref(), Some("id"));
}

#[tokio::test]
async fn test_missing_param_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/v1").expect(0).create_async().await;

    let client = client_for(&server, true);
    let err = client.delete_customer(Params::new()).await.unwrap_err();

    assert!(matches!(err, DevPayError::MissingParameter(ref key) if key == "id"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_repeated_calls_are_not_deduplicated() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1")
        .match_body(Matcher::UrlEncoded("method".to_owned(), "retrieve_customer".to_owned()))
        .with_status(200)
        .with_body(r#"{"id": "cus_1"}"#)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server, true);
    for _ in 0..2 {
        let response = client.retrieve_customer(Params::new().set("id", "cus_1")).await.unwrap();
        assert_eq!(response.id(), Some("cus_1"));
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1")
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let client = client_for(&server, true);
    let err = client.refund(Params::new().set("id", "ch_1")).await.unwrap_err();

    assert!(matches!(err, DevPayError::MalformedResponse { status: 503, .. }));
}

#[tokio::test]
async fn test_bill_customer_round_trip() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("method".to_owned(), "bill_customer".to_owned()),
            Matcher::UrlEncoded("id".to_owned(), "cus_7".to_owned()),
            Matcher::UrlEncoded("amount".to_owned(), "500".to_owned()),
        ]))
        .with_status(200)
        .with_body(r#"{"id": "cus_7", "description": "gold"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, true);
    let response =
        client.bill_customer(Params::new().set("id", "cus_7").set("amount", 500)).await.unwrap();
    let customer: devpay::response::Customer = response.deserialize().unwrap();

    assert_eq!(customer.id, "cus_7");
    assert_eq!(customer.description.as_deref(), Some("gold"));
    mock.assert_async().await;
}
