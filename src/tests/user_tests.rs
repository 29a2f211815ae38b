use crate::core::errors::LedgerError;
use crate::tests::{balance_of, create_test_service, register_user};

#[tokio::test]
async fn test_register_and_login() {
    let service = create_test_service();
    let user = register_user(&service, "Alice", "alice@example.com").await;

    let (token, logged_in) = service
        .authenticate("alice@example.com", "password123")
        .await
        .unwrap();
    assert_eq!(logged_in.id, user.id);

    let claims = service.validate_token(&token).unwrap();
    assert_eq!(claims.sub, user.id);

    let result = service.authenticate("alice@example.com", "wrong").await;
    assert!(matches!(result, Err(LedgerError::InvalidCredentials)));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let service = create_test_service();
    register_user(&service, "Alice", "alice@example.com").await;

    let result = service
        .register(
            "Other Alice".to_string(),
            "alice@example.com".to_string(),
            "password123".to_string(),
            None,
        )
        .await;
    assert!(matches!(result, Err(LedgerError::EmailAlreadyRegistered(_))));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let service = create_test_service();
    let result = service
        .register(
            "Bob".to_string(),
            "invalid".to_string(),
            "password123".to_string(),
            None,
        )
        .await;
    assert!(matches!(result, Err(LedgerError::InvalidEmail(_))));
}

#[tokio::test]
async fn test_registration_starts_with_zero_balance() {
    let service = create_test_service();
    let user = register_user(&service, "Alice", "alice@example.com").await;
    assert_eq!(balance_of(&service, &user.id).await, 0.0);
}

#[tokio::test]
async fn test_bank_details_round_trip() {
    let service = create_test_service();
    let user = register_user(&service, "Alice", "alice@example.com").await;

    service
        .save_bank_details(
            &user.id,
            Some("State Bank".to_string()),
            Some("alice@upi".to_string()),
            2500.75,
        )
        .await
        .unwrap();

    let details = service.bank_details(&user.id).await.unwrap();
    assert_eq!(details.bank_name.as_deref(), Some("State Bank"));
    assert_eq!(details.upi_id.as_deref(), Some("alice@upi"));
    assert_eq!(details.balance, Some(2500.75));

    let profile = service.profile(&user.id).await.unwrap();
    assert_eq!(profile.balance, Some(2500.75));
}

#[tokio::test]
async fn test_update_profile() {
    let service = create_test_service();
    let user = register_user(&service, "Alice", "alice@example.com").await;

    service
        .update_profile(&user.id, "Alice B".to_string(), "9876543210".to_string())
        .await
        .unwrap();

    let profile = service.profile(&user.id).await.unwrap();
    assert_eq!(profile.name, "Alice B");
    assert_eq!(profile.mobile_no.as_deref(), Some("9876543210"));

    let result = service
        .update_profile(&user.id, "Alice".to_string(), "  ".to_string())
        .await;
    assert!(matches!(result, Err(LedgerError::MissingField("mobile_no"))));
}

#[tokio::test]
async fn test_friend_request_lifecycle() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;

    service.send_friend_request(&alice.id, &bob.id).await.unwrap();

    // A duplicate in either direction is rejected.
    let result = service.send_friend_request(&bob.id, &alice.id).await;
    assert!(matches!(result, Err(LedgerError::DuplicateFriendRequest(_, _))));

    let requests = service.incoming_friend_requests(&bob.id).await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].sender_name, "Alice");

    service
        .respond_friend_request(&bob.id, &requests[0].id, "accept")
        .await
        .unwrap();

    let friends = service.friends(&alice.id).await.unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].id, bob.id);
    assert!(service.incoming_friend_requests(&bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_friend_request_to_self_rejected() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let result = service.send_friend_request(&alice.id, &alice.id).await;
    assert!(matches!(result, Err(LedgerError::InvalidInput(_, _))));
}
