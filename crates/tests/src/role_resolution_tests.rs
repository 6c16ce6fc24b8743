use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::{at, get, get_authed, new_user, post_json_authed, test_app};

// ─── Application role ───────────────────────────────────────────────────────

#[tokio::test]
async fn no_role_rows_resolves_to_tenant() {
    let app = test_app();
    let (_, token) = new_user("fresh@stazy.test");

    let (status, body) = get_authed(&app.router, "/api/me/roles", &token).await;

    assert_eq!(status, StatusCode::OK, "roles failed: {:?}", body);
    assert_eq!(body["app_role"], "tenant");
    assert_eq!(body["is_tenant"], true);
    assert_eq!(body["is_property_owner"], false);
    assert_eq!(body["is_admin"], false);
    assert_eq!(body["has_admin_role"], false);
    assert_eq!(body["dashboard"], "tenant");
    assert!(body.get("admin_role").is_none(), "no admin role expected: {:?}", body);
}

#[tokio::test]
async fn property_owner_lands_on_owner_dashboard() {
    let app = test_app();
    let (user_id, token) = new_user("owner@stazy.test");
    app.store.add_user_role(user_id, "property_owner", at(0));

    let (status, body) = get_authed(&app.router, "/api/me/roles", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["app_role"], "property_owner");
    assert_eq!(body["is_property_owner"], true);
    assert_eq!(body["is_tenant"], false);
    assert_eq!(body["dashboard"], "owner");
}

#[tokio::test]
async fn app_admin_counts_as_property_owner() {
    let app = test_app();
    let (user_id, token) = new_user("ops@stazy.test");
    app.store.add_user_role(user_id, "admin", at(0));

    let (_, body) = get_authed(&app.router, "/api/me/roles", &token).await;

    assert_eq!(body["app_role"], "admin");
    assert_eq!(body["is_admin"], true);
    assert_eq!(body["has_admin_role"], false, "app admin holds no admin_roles row");
    assert_eq!(body["is_property_owner"], true);
    assert_eq!(body["dashboard"], "owner");
}

#[tokio::test]
async fn earliest_app_role_row_wins() {
    let app = test_app();
    let (user_id, token) = new_user("twice@stazy.test");
    app.store.add_user_role(user_id, "tenant", at(10));
    app.store.add_user_role(user_id, "property_owner", at(1));

    let (_, body) = get_authed(&app.router, "/api/me/roles", &token).await;

    assert_eq!(body["app_role"], "property_owner");
}

#[tokio::test]
async fn unknown_stored_role_falls_back_to_tenant() {
    let app = test_app();
    let (user_id, token) = new_user("odd@stazy.test");
    app.store.add_user_role(user_id, "landlord", at(0));

    let (status, body) = get_authed(&app.router, "/api/me/roles", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["app_role"], "tenant");
}

#[tokio::test]
async fn lookup_failure_never_grants_privilege() {
    let app = test_app();
    let (user_id, token) = new_user("flaky@stazy.test");
    app.store.add_user_role(user_id, "property_owner", at(0));
    app.store.add_admin_role(user_id, "super_admin", None, at(0));
    app.store.fail_role_lookups.store(true, Ordering::SeqCst);

    let (status, body) = get_authed(&app.router, "/api/me/roles", &token).await;

    assert_eq!(status, StatusCode::OK, "resolution errors are not surfaced");
    assert_eq!(body["app_role"], "tenant");
    assert_eq!(body["is_admin"], false);
    assert_eq!(body["has_admin_role"], false);
    assert_eq!(body["permissions"]["is_support_admin"], false);
}

#[tokio::test]
async fn roles_require_a_session() {
    let app = test_app();

    let (status, body) = get(&app.router, "/api/me/roles").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "Unauthorized");
}

#[tokio::test]
async fn invalid_token_is_treated_as_anonymous() {
    let app = test_app();

    let (status, _) = get_authed(&app.router, "/api/me/roles", "not-a-jwt").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Admin role ─────────────────────────────────────────────────────────────

async fn admin_role_of(app: &crate::common::TestApp, token: &str) -> Value {
    let (status, body) = get_authed(&app.router, "/api/me/roles", token).await;
    assert_eq!(status, StatusCode::OK, "roles failed: {:?}", body);
    body
}

#[tokio::test]
async fn highest_rank_wins_regardless_of_insertion_order() {
    for order in [["support_admin", "finance_admin"], ["finance_admin", "support_admin"]] {
        let app = test_app();
        let (user_id, token) = new_user("multi@stazy.test");
        app.store.add_admin_role(user_id, order[0], None, at(0));
        app.store.add_admin_role(user_id, order[1], None, at(1));

        let body = admin_role_of(&app, &token).await;

        assert_eq!(body["admin_role"], "finance_admin", "order {:?}", order);
        assert_eq!(body["has_admin_role"], true);
        assert_eq!(body["is_admin"], false, "app role is still tenant");
        assert_eq!(body["permissions"]["is_finance_admin"], true);
        assert_eq!(body["permissions"]["is_platform_admin"], false);
    }
}

#[tokio::test]
async fn city_admin_surfaces_assigned_city() {
    let app = test_app();
    let (user_id, token) = new_user("pune@stazy.test");
    app.store.add_admin_role(user_id, "city_admin", Some("Pune"), at(0));

    let body = admin_role_of(&app, &token).await;

    assert_eq!(body["admin_role"], "city_admin");
    assert_eq!(body["assigned_city"], "Pune");
    assert_eq!(body["permissions"]["is_city_admin"], true);
    assert_eq!(body["permissions"]["is_platform_admin"], false);
    assert_eq!(body["permissions"]["is_super_admin"], false);
    assert_eq!(body["permissions"]["is_support_admin"], true);
}

#[tokio::test]
async fn super_admin_holds_every_permission() {
    let app = test_app();
    let (user_id, token) = new_user("root@stazy.test");
    app.store.add_admin_role(user_id, "super_admin", None, at(0));

    let body = admin_role_of(&app, &token).await;

    let permissions = body["permissions"].as_object().expect("permissions object");
    assert_eq!(permissions.len(), 8);
    assert!(permissions.values().all(|v| v == true), "{:?}", permissions);
}

#[tokio::test]
async fn unknown_admin_rows_are_skipped() {
    let app = test_app();
    let (user_id, token) = new_user("legacy@stazy.test");
    app.store.add_admin_role(user_id, "overlord", None, at(0));
    app.store.add_admin_role(user_id, "community_moderator", None, at(1));

    let body = admin_role_of(&app, &token).await;

    assert_eq!(body["admin_role"], "community_moderator");
}

// ─── Signup role ────────────────────────────────────────────────────────────

#[tokio::test]
async fn signup_can_choose_property_owner() {
    let app = test_app();
    let (user_id, token) = new_user("new-owner@stazy.test");

    let (status, body) = post_json_authed(
        &app.router,
        "/api/users/role",
        r#"{"role":"property_owner"}"#,
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "assign failed: {:?}", body);
    assert_eq!(body["role"], "property_owner");
    assert_eq!(body["user_id"], user_id.to_string());

    let (_, roles) = get_authed(&app.router, "/api/me/roles", &token).await;
    assert_eq!(roles["app_role"], "property_owner");
}

#[tokio::test]
async fn signup_cannot_choose_admin() {
    let app = test_app();
    let (_, token) = new_user("sneaky@stazy.test");

    let (status, body) =
        post_json_authed(&app.router, "/api/users/role", r#"{"role":"admin"}"#, &token).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "tenant");
}

#[tokio::test]
async fn signup_defaults_to_tenant_and_runs_once() {
    let app = test_app();
    let (_, token) = new_user("once@stazy.test");

    let (status, body) = post_json_authed(&app.router, "/api/users/role", "{}", &token).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "tenant");

    let (status, body) = post_json_authed(
        &app.router,
        "/api/users/role",
        r#"{"role":"property_owner"}"#,
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{:?}", body);
}

#[tokio::test]
async fn concurrent_signup_claims_leave_one_row() {
    let app = test_app();
    let (user_id, token) = new_user("racer@stazy.test");

    let (first, second) = tokio::join!(
        post_json_authed(&app.router, "/api/users/role", r#"{"role":"tenant"}"#, &token),
        post_json_authed(
            &app.router,
            "/api/users/role",
            r#"{"role":"property_owner"}"#,
            &token
        ),
    );

    let mut statuses = [first.0.as_u16(), second.0.as_u16()];
    statuses.sort();
    assert_eq!(statuses, [201, 409], "one claim wins, the other conflicts");
    let rows = app
        .store
        .user_roles
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.user_id == user_id)
        .count();
    assert_eq!(rows, 1);
}
