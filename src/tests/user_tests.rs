use crate::core::errors::SettlementError;
use crate::core::models::{UserBase, UserLogin};
use crate::tests::{create_test_service, new_user, signed_in};

#[tokio::test]
async fn test_signup_returns_active_user() {
    let service = create_test_service();
    let user = service.signup(new_user("alice")).await.unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.username, "alice");
    assert!(user.is_active);
    assert_eq!(service.get_user(user.id).await.unwrap(), user);
}

#[tokio::test]
async fn test_signup_rejects_duplicates() {
    let service = create_test_service();
    service.signup(new_user("alice")).await.unwrap();

    let same_email = service.signup(new_user("alice")).await;
    assert_eq!(same_email, Err(SettlementError::AlreadyRegistered));

    let mut same_username = new_user("alice");
    same_username.email = "other@example.com".to_string();
    assert_eq!(
        service.signup(same_username).await,
        Err(SettlementError::AlreadyRegistered)
    );
}

#[tokio::test]
async fn test_signup_validates_fields() {
    let service = create_test_service();

    let mut short_password = new_user("bob");
    short_password.password = "short".to_string();
    assert!(matches!(
        service.signup(short_password).await,
        Err(SettlementError::InvalidInput { field, .. }) if field == "password"
    ));

    let mut short_username = new_user("bob");
    short_username.username = "bo".to_string();
    assert!(matches!(
        service.signup(short_username).await,
        Err(SettlementError::InvalidInput { field, .. }) if field == "username"
    ));

    let mut bad_email = new_user("bob");
    bad_email.email = "not-an-email".to_string();
    assert!(matches!(
        service.signup(bad_email).await,
        Err(SettlementError::InvalidInput { field, .. }) if field == "email"
    ));
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let service = create_test_service();
    service.signup(new_user("carol")).await.unwrap();

    let result = service
        .login(UserLogin {
            email: "carol@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await;
    assert_eq!(result, Err(SettlementError::InvalidCredentials));

    let unknown = service
        .login(UserLogin {
            email: "nobody@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await;
    assert_eq!(unknown, Err(SettlementError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_token_resolves_to_user() {
    let service = create_test_service();
    let user = signed_in(&service, "dave").await;
    assert_eq!(user.username, "dave");

    assert_eq!(
        service.current_user("garbage").await,
        Err(SettlementError::InvalidToken)
    );
}

#[tokio::test]
async fn test_update_profile() {
    let service = create_test_service();
    let erin = signed_in(&service, "erin").await;
    signed_in(&service, "frank").await;

    let updated = service
        .update_profile(
            &erin,
            UserBase {
                email: "erin@work.example.com".to_string(),
                username: "erin".to_string(),
                full_name: Some("Erin E.".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.email, "erin@work.example.com");
    assert_eq!(updated.full_name.as_deref(), Some("Erin E."));

    let token = service
        .login(UserLogin {
            email: "erin@work.example.com".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    let erin = service.current_user(&token.access_token).await.unwrap();
    let taken_username = service
        .update_profile(
            &erin,
            UserBase {
                email: erin.email.clone(),
                username: "frank".to_string(),
                full_name: None,
            },
        )
        .await;
    assert_eq!(taken_username, Err(SettlementError::UsernameTaken));

    let taken_email = service
        .update_profile(
            &erin,
            UserBase {
                email: "frank@example.com".to_string(),
                username: "erin".to_string(),
                full_name: None,
            },
        )
        .await;
    assert_eq!(taken_email, Err(SettlementError::EmailTaken));
}

#[tokio::test]
async fn test_get_unknown_user() {
    let service = create_test_service();
    assert_eq!(service.get_user(999).await, Err(SettlementError::UserNotFound));
}
