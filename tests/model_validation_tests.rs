use mill_portal::{
    access::{Role, UserAccess},
    models::{SessionProfile, UserRecord},
};
use uuid::Uuid;

#[test]
fn test_user_record_reads_user_type_key() {
    // The auth collaborator sends camelCase `userType` next to snake_case grants.
    let json = r#"{
        "id": "00000000-0000-0000-0000-000000000007",
        "email": "lab@mill.test",
        "role": "operator",
        "userType": "Plant Admin",
        "system_access": "batchcode",
        "page_access": null
    }"#;

    let record: UserRecord = serde_json::from_str(json).unwrap();

    assert_eq!(record.user_type.as_deref(), Some("Plant Admin"));
    assert!(record.page_access.is_none());
    assert!(record.user_access.is_none());
    assert_eq!(UserAccess::from_record(&record).role, Role::Admin);
}

#[test]
fn test_user_record_tolerates_missing_grant_fields() {
    let json = r#"{ "id": "00000000-0000-0000-0000-000000000008", "email": "x@mill.test" }"#;

    let record: UserRecord = serde_json::from_str(json).unwrap();
    let access = UserAccess::from_record(&record);

    assert_eq!(access.role, Role::Standard);
    assert!(!access.has_grants());
}

#[test]
fn test_user_record_serializes_user_type_in_camel_case() {
    let record = UserRecord {
        id: Uuid::nil(),
        email: "a@mill.test".to_string(),
        user_type: Some("operator".to_string()),
        ..UserRecord::default()
    };

    let json_output = serde_json::to_string(&record).unwrap();

    assert!(json_output.contains(r#""userType":"operator""#));
    assert!(!json_output.contains("user_type"));
}

#[test]
fn test_role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    assert_eq!(serde_json::to_string(&Role::Standard).unwrap(), r#""standard""#);
}

#[test]
fn test_session_profile_expiry_is_nullable() {
    let profile = SessionProfile {
        id: Uuid::nil(),
        email: "a@mill.test".to_string(),
        role: Role::Standard,
        role_label: "Operator".to_string(),
        systems: vec![],
        pages: vec![],
        landing_path: "/".to_string(),
        expires_at: None,
    };

    let json_output = serde_json::to_string(&profile).unwrap();

    assert!(json_output.contains(r#""expires_at":null"#));
}
