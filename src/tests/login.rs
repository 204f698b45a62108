use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_login() {
    let mut app = helper::setup_test_app().await;

    helper::sign_up(&mut app, "someone@example.com").await;

    let (status_code, access_token, _) =
        helper::maybe_sign_in(&mut app, "someone@example.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(access_token.unwrap().len() > 10);

    // email addresses are not case sensitive
    let (status_code, _, _) =
        helper::maybe_sign_in(&mut app, " SOMEONE@example.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::OK, status_code);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let mut app = helper::setup_test_app().await;

    helper::sign_up(&mut app, "someone@example.com").await;

    let (status_code, _, error) =
        helper::maybe_sign_in(&mut app, "someone@example.com", "notsosecret").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid credentials".to_string()), error);

    // unknown users get the same answer
    let (status_code, _, error) =
        helper::maybe_sign_in(&mut app, "nobody@example.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid credentials".to_string()), error);
}
