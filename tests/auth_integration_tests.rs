use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use mill_portal::{
    AppState,
    access::Role,
    auth::{Claims, Session},
    config::{AppConfig, Env},
    directory::UserDirectory,
    models::UserRecord,
};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Mock Directory for Auth Logic ---

#[derive(Default)]
struct MockAuthDirectory {
    user_to_return: Option<UserRecord>,
}

#[async_trait]
impl UserDirectory for MockAuthDirectory {
    async fn get_user(&self, _id: Uuid) -> Option<UserRecord> {
        self.user_to_return.clone()
    }
    async fn list_users(&self) -> Vec<UserRecord> {
        self.user_to_return.clone().into_iter().collect()
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn create_token_with_exp(user_id: Uuid, exp: u64, secret: &str) -> String {
    let claims = Claims {
        sub: user_id,
        iat: now_secs() as usize,
        exp: exp as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_token(user_id: Uuid, exp_offset: u64) -> String {
    create_token_with_exp(user_id, now_secs() + exp_offset, TEST_JWT_SECRET)
}

fn hot_coil_operator() -> UserRecord {
    UserRecord {
        id: TEST_USER_ID,
        email: "operator@mill.test".to_string(),
        role: Some("Operator".to_string()),
        system_access: Some("batchcode".to_string()),
        page_access: Some("Hot Coil".to_string()),
        ..UserRecord::default()
    }
}

fn create_app_state(env: Env, directory: MockAuthDirectory) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };

    AppState {
        directory: Arc::new(directory),
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

/// Both extractor traits are in scope, so the mandatory one is named explicitly.
async fn extract(parts: &mut Parts, state: &AppState) -> Result<Session, StatusCode> {
    <Session as FromRequestParts<AppState>>::from_request_parts(parts, state).await
}

fn bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
}

// --- Tests ---

#[tokio::test]
async fn test_session_from_valid_jwt() {
    let token = create_token(TEST_USER_ID, 3600);
    let app_state = create_app_state(
        Env::Production,
        MockAuthDirectory {
            user_to_return: Some(hot_coil_operator()),
        },
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let session = extract(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(session.id, TEST_USER_ID);
    assert_eq!(session.access.role, Role::Standard);
    assert!(session.expires_at.is_some());
    assert!(session.allows("/batchcode/hot-coil"));
    assert!(!session.allows("/batchcode/qc-lab"));
    assert_eq!(session.landing_path(), "/batchcode/hot-coil");
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(Env::Production, MockAuthDirectory::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let session = extract(&mut parts, &app_state).await;

    assert_eq!(session.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let token = create_token_with_exp(TEST_USER_ID, now_secs() - 3600, TEST_JWT_SECRET);
    let app_state = create_app_state(
        Env::Production,
        MockAuthDirectory {
            user_to_return: Some(hot_coil_operator()),
        },
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let session = extract(&mut parts, &app_state).await;

    assert_eq!(session.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_foreign_signature() {
    let token = create_token_with_exp(TEST_USER_ID, now_secs() + 3600, "some-other-secret");
    let app_state = create_app_state(
        Env::Production,
        MockAuthDirectory {
            user_to_return: Some(hot_coil_operator()),
        },
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let session = extract(&mut parts, &app_state).await;

    assert_eq!(session.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_when_user_left_directory() {
    let token = create_token(TEST_USER_ID, 3600);
    let app_state = create_app_state(Env::Production, MockAuthDirectory::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let session = extract(&mut parts, &app_state).await;

    assert_eq!(session.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_bypass_success() {
    let admin_id = Uuid::new_v4();
    let app_state = create_app_state(
        Env::Local,
        MockAuthDirectory {
            user_to_return: Some(UserRecord {
                id: admin_id,
                email: "shift-lead@mill.test".to_string(),
                user_type: Some("Admin".to_string()),
                ..UserRecord::default()
            }),
        },
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&admin_id.to_string()).unwrap(),
    );

    let session = extract(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(session.id, admin_id);
    assert!(session.is_admin());
    assert!(session.expires_at.is_none());
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let app_state = create_app_state(
        Env::Production,
        MockAuthDirectory {
            user_to_return: Some(hot_coil_operator()),
        },
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&TEST_USER_ID.to_string()).unwrap(),
    );

    let session = extract(&mut parts, &app_state).await;

    assert_eq!(session.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_optional_session_is_none_without_credentials() {
    let app_state = create_app_state(Env::Production, MockAuthDirectory::default());

    let mut parts = get_request_parts(Method::GET, "/access/landing".parse().unwrap());

    let session =
        <Session as OptionalFromRequestParts<AppState>>::from_request_parts(&mut parts, &app_state)
            .await
            .unwrap();

    assert!(session.is_none());
}

#[tokio::test]
async fn test_session_profile_reflects_grants() {
    let session = Session::from_record(&hot_coil_operator(), None);
    let profile = session.profile();

    assert_eq!(profile.role, Role::Standard);
    assert_eq!(profile.role_label, "Operator");
    assert_eq!(profile.systems, vec!["batchcode".to_string()]);
    assert_eq!(profile.pages, vec!["/batchcode/hot-coil".to_string()]);
    assert_eq!(profile.landing_path, "/batchcode/hot-coil");
}
