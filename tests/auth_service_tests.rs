//! 账户生命周期编排测试
//!
//! 覆盖注册、登录、登出和令牌解析的完整链路,底层使用进程内存储。

mod common;

use account_service::{
    error::AppError,
    models::auth::LoginRequest,
};
use common::{register_request, FailingSessionStore, TestHarness};
use std::sync::Arc;

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_login_logout_lifecycle() {
    let harness = TestHarness::new();

    // 注册即登录:返回的令牌立即可用
    let registered = harness
        .service
        .register(register_request("a@x.com", "15550000001"), "corr-1")
        .await
        .unwrap();

    assert_eq!(registered.token_type, "bearer");
    assert_eq!(registered.expires_in, 24 * 3600);
    assert_eq!(registered.user.email, "a@x.com");
    assert_eq!(registered.user.role, "rider");

    let resolved = harness
        .service
        .resolve(&registered.access_token)
        .await
        .unwrap();
    assert_eq!(resolved.id, registered.user.id);

    // 登出后同一令牌立即失效
    harness.service.logout(&registered.access_token).await.unwrap();

    assert!(matches!(
        harness.service.resolve(&registered.access_token).await,
        Err(AppError::TokenInvalid)
    ));

    // 登出后可以重新登录
    let relogin = harness
        .service
        .login(login_request("a@x.com", "Str0ng!Pw"), "corr-2")
        .await
        .unwrap();
    assert!(harness.service.resolve(&relogin.access_token).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let harness = TestHarness::new();

    harness
        .service
        .register(register_request("a@x.com", "15550000001"), "corr-1")
        .await
        .unwrap();

    let result = harness
        .service
        .register(register_request("a@x.com", "15550000002"), "corr-2")
        .await;

    assert!(matches!(result, Err(AppError::EmailTaken)));
    assert_eq!(harness.users.user_count(), 1);
}

#[tokio::test]
async fn test_duplicate_phone_rejected() {
    let harness = TestHarness::new();

    harness
        .service
        .register(register_request("a@x.com", "15550000001"), "corr-1")
        .await
        .unwrap();

    let result = harness
        .service
        .register(register_request("b@x.com", "15550000001"), "corr-2")
        .await;

    assert!(matches!(result, Err(AppError::PhoneTaken)));
    assert_eq!(harness.users.user_count(), 1);
}

#[tokio::test]
async fn test_credential_failures_are_indistinguishable() {
    let harness = TestHarness::new();

    let registered = harness
        .service
        .register(register_request("a@x.com", "15550000001"), "corr-1")
        .await
        .unwrap();

    // 未知邮箱
    let unknown = harness
        .service
        .login(login_request("nobody@x.com", "Str0ng!Pw"), "corr-2")
        .await;
    assert!(matches!(unknown, Err(AppError::InvalidCredentials)));

    // 密码错误
    let wrong_password = harness
        .service
        .login(login_request("a@x.com", "WrongPassword1"), "corr-3")
        .await;
    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));

    // 已停用账号
    harness.users.set_active(registered.user.id, false);
    let deactivated = harness
        .service
        .login(login_request("a@x.com", "Str0ng!Pw"), "corr-4")
        .await;
    assert!(matches!(deactivated, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_second_login_supersedes_first_token() {
    let harness = TestHarness::new();

    harness
        .service
        .register(register_request("a@x.com", "15550000001"), "corr-1")
        .await
        .unwrap();

    let first = harness
        .service
        .login(login_request("a@x.com", "Str0ng!Pw"), "corr-2")
        .await
        .unwrap();
    let second = harness
        .service
        .login(login_request("a@x.com", "Str0ng!Pw"), "corr-3")
        .await
        .unwrap();

    assert_ne!(first.access_token, second.access_token);

    // 新登录覆盖会话记录,旧令牌虽然签名有效也会被拒绝
    assert!(matches!(
        harness.service.resolve(&first.access_token).await,
        Err(AppError::TokenInvalid)
    ));
    assert!(harness.service.resolve(&second.access_token).await.is_ok());
}

#[tokio::test]
async fn test_deactivation_takes_effect_on_resolve() {
    let harness = TestHarness::new();

    let registered = harness
        .service
        .register(register_request("a@x.com", "15550000001"), "corr-1")
        .await
        .unwrap();

    assert!(harness.service.resolve(&registered.access_token).await.is_ok());

    // 停用后,已签发的令牌立即失效
    harness.users.set_active(registered.user.id, false);

    assert!(matches!(
        harness.service.resolve(&registered.access_token).await,
        Err(AppError::TokenInvalid)
    ));
}

#[tokio::test]
async fn test_store_outage_keeps_registration_but_fails_resolve_closed() {
    let (service, users) = TestHarness::service_with_store(Arc::new(FailingSessionStore));

    // 会话写入是尽力而为:存储故障不影响注册本身
    let registered = service
        .register(register_request("a@x.com", "15550000001"), "corr-1")
        .await
        .unwrap();
    assert_eq!(users.user_count(), 1);
    assert!(!registered.access_token.is_empty());

    // 但解析必须失败关闭,而不是只信签名
    assert!(matches!(
        service.resolve(&registered.access_token).await,
        Err(AppError::TokenInvalid)
    ));
}

#[tokio::test]
async fn test_logout_requires_live_session() {
    let harness = TestHarness::new();

    let registered = harness
        .service
        .register(register_request("a@x.com", "15550000001"), "corr-1")
        .await
        .unwrap();

    harness.service.logout(&registered.access_token).await.unwrap();

    // 重复登出:令牌已失效
    assert!(matches!(
        harness.service.logout(&registered.access_token).await,
        Err(AppError::TokenInvalid)
    ));
}
