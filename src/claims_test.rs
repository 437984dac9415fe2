use super::*;

#[test]
fn custom_claims_none_without_user() {
    assert!(custom_claims(None).is_none());
}

#[test]
fn custom_claims_none_when_metadata_missing() {
    let user: AuthUser = serde_json::from_str(r#"{"sub":"u1"}"#).unwrap();
    assert!(custom_claims(Some(&user)).is_none());
}

#[test]
fn custom_claims_parses_jwt_payload_shape() {
    let user: AuthUser = serde_json::from_value(serde_json::json!({
        "sub": "u1",
        "app_metadata": {
            "custom_claims": {
                "groups": [
                    { "id": "g1", "name": "Leads", "permissions": ["member-portal.tenure.update"] }
                ]
            }
        }
    }))
    .unwrap();

    let claims = custom_claims(Some(&user)).unwrap();
    assert_eq!(claims.groups.len(), 1);
    assert_eq!(claims.groups[0].name, "Leads");
    assert_eq!(claims.groups[0].permissions, vec!["member-portal.tenure.update".to_owned()]);
}

#[test]
fn auth_user_accepts_id_alias() {
    let user: AuthUser = serde_json::from_str(r#"{"id":"u2","app_metadata":{}}"#).unwrap();
    assert_eq!(user.user_id, "u2");
}
