mod common;

use std::rc::Rc;

use common::{MockTransport, init_logging};
use glowguide::services::{AccountClient, MemoryTokenStore, RequestBody, TokenStore};
use glowguide::{AccountError, GeneratedLook, MakeupSpec, RegistrationForm, ResultKind, SaveResultRequest};
use reqwest::Method;
use serde_json::json;

fn client(transport: &Rc<MockTransport>, tokens: &Rc<MemoryTokenStore>) -> AccountClient {
    AccountClient::new(transport.clone(), tokens.clone())
}

#[tokio::test]
async fn login_posts_form_and_stores_token() {
    init_logging();
    let transport = Rc::new(
        MockTransport::new().respond(200, json!({ "access_token": "tok-1", "token_type": "bearer" })),
    );
    let tokens = Rc::new(MemoryTokenStore::new());
    let account = client(&transport, &tokens);

    let token = account.login("ana", "secret1").await.unwrap();

    assert_eq!(token.access_token, "tok-1");
    assert_eq!(tokens.load().as_deref(), Some("tok-1"));
    assert!(account.is_signed_in());

    let call = transport.last_call().unwrap();
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/token");
    assert_eq!(call.bearer, None);
    assert_eq!(
        call.body,
        RequestBody::Form(vec![
            ("username".to_string(), "ana".to_string()),
            ("password".to_string(), "secret1".to_string()),
        ])
    );
}

#[tokio::test]
async fn rejected_login_reports_detail_and_keeps_signed_out() {
    let transport = Rc::new(
        MockTransport::new()
            .respond(401, json!({ "detail": "Incorrect username or password" }))
            .respond(401, json!({})),
    );
    let tokens = Rc::new(MemoryTokenStore::new());
    let account = client(&transport, &tokens);

    assert_eq!(
        account.login("ana", "nope").await,
        Err(AccountError::Rejected("Incorrect username or password".to_string()))
    );
    assert_eq!(
        account.login("ana", "nope").await,
        Err(AccountError::Rejected(
            "Login failed. Please check your credentials.".to_string()
        ))
    );
    assert!(!account.is_signed_in());
}

#[tokio::test]
async fn registration_is_checked_locally_before_sending() {
    let transport = Rc::new(MockTransport::new().respond(200, json!({ "access_token": "tok-2" })));
    let tokens = Rc::new(MemoryTokenStore::new());
    let account = client(&transport, &tokens);

    let mut form = RegistrationForm {
        username: "ana".to_string(),
        password: "12345".to_string(),
        accepted_terms: false,
    };
    assert_eq!(
        account.register(&form).await,
        Err(AccountError::InvalidInput(
            "Please agree to Terms of Service and Privacy Policy.".to_string()
        ))
    );

    form.accepted_terms = true;
    assert_eq!(
        account.register(&form).await,
        Err(AccountError::InvalidInput(
            "Password must be at least 6 characters long.".to_string()
        ))
    );
    assert_eq!(transport.call_count(), 0);

    form.password = "123456".to_string();
    account.register(&form).await.unwrap();
    assert_eq!(tokens.load().as_deref(), Some("tok-2"));
    assert_eq!(
        transport.last_call().unwrap().body,
        RequestBody::Json(json!({ "username": "ana", "password": "123456" }))
    );
}

#[tokio::test]
async fn save_result_requires_sign_in_and_sends_bearer() {
    let transport = Rc::new(MockTransport::new().respond(200, json!({ "id": "r1" })));
    let tokens = Rc::new(MemoryTokenStore::new());
    let account = client(&transport, &tokens);
    let look = GeneratedLook {
        image_url: "https://x/y.png".to_string(),
        prompt: "p".to_string(),
        spec: MakeupSpec::default(),
    };
    let request = SaveResultRequest::from_look(&look);

    assert_eq!(
        account.save_result(&request).await,
        Err(AccountError::LoginRequired)
    );
    assert_eq!(transport.call_count(), 0);

    tokens.save("tok-3").unwrap();
    account.save_result(&request).await.unwrap();

    let call = transport.last_call().unwrap();
    assert_eq!(call.path, "/save-result");
    assert_eq!(call.bearer.as_deref(), Some("tok-3"));
    let RequestBody::Json(body) = call.body else {
        panic!("expected JSON body");
    };
    assert_eq!(body["type"], "generate-look");
    assert_eq!(body["image_url"], "https://x/y.png");
    assert_eq!(request.kind, ResultKind::GenerateLook);
}

#[tokio::test]
async fn unauthorized_response_signs_out() {
    init_logging();
    let transport = Rc::new(MockTransport::new().respond(401, json!({ "detail": "Token expired" })));
    let tokens = Rc::new(MemoryTokenStore::with_token("stale"));
    let account = client(&transport, &tokens);

    assert_eq!(
        account.saved_results().await,
        Err(AccountError::LoginRequired)
    );
    assert_eq!(tokens.load(), None);
}

#[tokio::test]
async fn profile_refusal_of_any_kind_signs_out() {
    let transport = Rc::new(
        MockTransport::new()
            .respond(200, json!({ "username": "ana", "created_at": "2024-05-01T10:20:30" }))
            .respond(404, json!({ "detail": "User not found" })),
    );
    let tokens = Rc::new(MemoryTokenStore::with_token("tok"));
    let account = client(&transport, &tokens);

    let profile = account.profile().await.unwrap();
    assert_eq!(profile.username, "ana");
    assert_eq!(profile.email, None);
    assert_eq!(transport.last_call().unwrap().path, "/users/me");

    assert_eq!(account.profile().await, Err(AccountError::LoginRequired));
    assert!(!account.is_signed_in());
}

#[tokio::test]
async fn saved_results_can_be_listed_and_deleted() {
    let transport = Rc::new(
        MockTransport::new()
            .respond(
                200,
                json!([{
                    "id": "42",
                    "type": "generate-look",
                    "title": "AI Generated Look",
                    "image_url": "https://x/y.png",
                    "created_at": "2024-05-01T10:20:30Z"
                }]),
            )
            .respond(204, json!(null))
            .respond(500, json!({ "detail": "db down" })),
    );
    let tokens = Rc::new(MemoryTokenStore::with_token("tok"));
    let account = client(&transport, &tokens);

    let results = account.saved_results().await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, ResultKind::GenerateLook);
    assert_eq!(results[0].prompt, None);

    account.delete_saved_result("42").await.unwrap();
    let call = transport.last_call().unwrap();
    assert_eq!(call.method, Method::DELETE);
    assert_eq!(call.path, "/saved-results/42");

    assert_eq!(
        account.delete_saved_result("43").await,
        Err(AccountError::Rejected("db down".to_string()))
    );
    assert!(account.is_signed_in());
}

#[tokio::test]
async fn username_update_validates_and_puts_json() {
    let transport = Rc::new(MockTransport::new().respond(200, json!({})));
    let tokens = Rc::new(MemoryTokenStore::with_token("tok"));
    let account = client(&transport, &tokens);

    assert_eq!(
        account.update_username("   ").await,
        Err(AccountError::InvalidInput("Username cannot be empty".to_string()))
    );

    account.update_username(" bella ").await.unwrap();
    let call = transport.last_call().unwrap();
    assert_eq!(call.method, Method::PUT);
    assert_eq!(call.body, RequestBody::Json(json!({ "username": "bella" })));

    account.logout().unwrap();
    assert!(!account.is_signed_in());
}

#[tokio::test]
async fn network_failure_is_reported_as_connectivity() {
    let transport = Rc::new(MockTransport::new().fail("timed out"));
    let tokens = Rc::new(MemoryTokenStore::new());
    let account = client(&transport, &tokens);

    assert_eq!(
        account.login("ana", "secret1").await,
        Err(AccountError::Connectivity)
    );
}

#[tokio::test]
async fn malformed_result_ids_are_refused_before_sending() {
    let transport = Rc::new(MockTransport::new());
    let tokens = Rc::new(MemoryTokenStore::with_token("tok"));
    let account = client(&transport, &tokens);

    for id in ["", "../users/me", "42/../../token", "a b", "%2e%2e"] {
        assert!(matches!(
            account.delete_saved_result(id).await,
            Err(AccountError::InvalidInput(_))
        ));
    }
    assert_eq!(transport.call_count(), 0);
    assert!(account.is_signed_in());
}
