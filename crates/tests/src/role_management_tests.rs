use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_types::RoomAvailability;

use crate::common::{
    at, delete_authed, get, get_authed, new_user, post_json_authed, test_app,
    test_app_without_mailer, TestApp,
};

/// Seed an admin with a profile and return (user id, assignment id, token).
fn seed_admin(app: &TestApp, name: &str, email: &str, role: &str, minute: i64) -> (Uuid, Uuid, String) {
    let (user_id, token) = new_user(email);
    app.store.add_profile(user_id, name, email);
    let assignment = app.store.add_admin_role(user_id, role, None, at(minute));
    (user_id, assignment, token)
}

fn entry_for<'a>(entries: &'a Value, assignment: Uuid) -> &'a Value {
    entries
        .as_array()
        .expect("entries array")
        .iter()
        .find(|e| e["assignment"]["id"] == assignment.to_string())
        .expect("entry for assignment")
}

// ─── List ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_joins_profiles_newest_first() {
    let app = test_app();
    let (_, root, root_token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);
    let (_, finance, _) = seed_admin(&app, "Fin Ance", "fin@stazy.test", "finance_admin", 5);

    let (status, body) = get_authed(&app.router, "/api/admin/roles", &root_token).await;

    assert_eq!(status, StatusCode::OK, "{:?}", body);
    let ids: Vec<Value> = body
        .as_array()
        .expect("entries array")
        .iter()
        .map(|e| e["assignment"]["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!(finance.to_string()), json!(root.to_string())]);

    let entry = entry_for(&body, finance);
    assert_eq!(entry["full_name"], "Fin Ance");
    assert_eq!(entry["email"], "fin@stazy.test");
    assert_eq!(entry["label"], "Finance Admin");
}

#[tokio::test]
async fn remove_is_never_offered_for_super_admins() {
    let app = test_app();
    let (_, root, root_token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);
    let (_, city, _) = seed_admin(&app, "Cit Y", "city@stazy.test", "city_admin", 1);
    let (_, _, support_token) = seed_admin(&app, "Sup Port", "sup@stazy.test", "support_admin", 2);

    let (_, body) = get_authed(&app.router, "/api/admin/roles", &root_token).await;
    assert_eq!(entry_for(&body, root)["can_remove"], false);
    assert_eq!(entry_for(&body, city)["can_remove"], true);

    let (_, body) = get_authed(&app.router, "/api/admin/roles", &support_token).await;
    assert!(
        body.as_array()
            .expect("entries array")
            .iter()
            .all(|e| e["can_remove"] == false),
        "support admins cannot manage roles: {:?}",
        body
    );
}

#[tokio::test]
async fn search_matches_name_email_and_role() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);
    let (_, finance, _) = seed_admin(&app, "Fin Ance", "fin@stazy.test", "finance_admin", 1);
    seed_admin(&app, "Mo Derator", "mod@stazy.test", "community_moderator", 2);

    for q in ["fin%20ance", "FIN@", "finance_admin"] {
        let (_, body) = get_authed(&app.router, &format!("/api/admin/roles?q={q}"), &token).await;
        let entries = body.as_array().expect("entries array");
        assert_eq!(entries.len(), 1, "query {q}: {:?}", body);
        assert_eq!(entries[0]["assignment"]["id"], finance.to_string());
    }

    let (_, body) = get_authed(&app.router, "/api/admin/roles?q=", &token).await;
    assert_eq!(body.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn stats_count_the_top_four_roles() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);
    seed_admin(&app, "Pat Form", "pat@stazy.test", "platform_admin", 1);
    seed_admin(&app, "Plat Two", "pat2@stazy.test", "platform_admin", 2);
    seed_admin(&app, "Sup Port", "sup@stazy.test", "support_admin", 3);

    let (status, body) = get_authed(&app.router, "/api/admin/roles/stats", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    let by_role = body["by_role"].as_array().expect("by_role array");
    let roles: Vec<&str> = by_role.iter().filter_map(|r| r["role"].as_str()).collect();
    assert_eq!(
        roles,
        vec!["super_admin", "platform_admin", "finance_admin", "verification_admin"]
    );
    assert_eq!(by_role[0]["count"], 1);
    assert_eq!(by_role[1]["count"], 2);
    assert_eq!(by_role[2]["count"], 0);
}

#[tokio::test]
async fn list_requires_an_admin() {
    let app = test_app();
    let (_, token) = new_user("tenant@stazy.test");

    let (status, _) = get_authed(&app.router, "/api/admin/roles", &token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ─── Add admin ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn platform_admin_grants_role_by_email() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Pat Form", "pat@stazy.test", "platform_admin", 0);
    let (new_id, _) = new_user("newbie@stazy.test");
    app.store.add_profile(new_id, "New Bie", "NewBie@stazy.test");

    let body = json!({ "email": "newbie@stazy.test", "admin_role": "finance_admin" });
    let (status, response) =
        post_json_authed(&app.router, "/api/admin/roles", &body.to_string(), &token).await;

    assert_eq!(status, StatusCode::CREATED, "{:?}", response);
    assert_eq!(response["user_id"], new_id.to_string());
    assert_eq!(response["admin_role"], "finance_admin");
    assert_eq!(response["assigned_city"], Value::Null);
}

#[tokio::test]
async fn city_is_kept_only_for_city_admins() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);
    let (city_id, _) = new_user("city@stazy.test");
    app.store.add_profile(city_id, "Cit Y", "city@stazy.test");
    let (verify_id, _) = new_user("verify@stazy.test");
    app.store.add_profile(verify_id, "Veri Fy", "verify@stazy.test");

    let body = json!({ "email": "city@stazy.test", "admin_role": "city_admin", "assigned_city": " Pune " });
    let (_, response) =
        post_json_authed(&app.router, "/api/admin/roles", &body.to_string(), &token).await;
    assert_eq!(response["assigned_city"], "Pune");

    let body = json!({ "email": "verify@stazy.test", "admin_role": "verification_admin", "assigned_city": "Pune" });
    let (_, response) =
        post_json_authed(&app.router, "/api/admin/roles", &body.to_string(), &token).await;
    assert_eq!(response["assigned_city"], Value::Null);
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);

    let body = json!({ "email": "ghost@stazy.test", "admin_role": "support_admin" });
    let (status, response) =
        post_json_authed(&app.router, "/api/admin/roles", &body.to_string(), &token).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["message"], "No user found with that email address");
}

#[tokio::test]
async fn existing_admin_conflicts() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);
    seed_admin(&app, "Sup Port", "sup@stazy.test", "support_admin", 1);

    let body = json!({ "email": "sup@stazy.test", "admin_role": "finance_admin" });
    let (status, response) =
        post_json_authed(&app.router, "/api/admin/roles", &body.to_string(), &token).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["message"], "This user already has an admin role");
}

#[tokio::test]
async fn blank_email_is_rejected() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);

    let body = json!({ "email": "", "admin_role": "support_admin" });
    let (status, response) =
        post_json_authed(&app.router, "/api/admin/roles", &body.to_string(), &token).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{:?}", response);
}

#[tokio::test]
async fn granter_cannot_exceed_own_rank() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Pat Form", "pat@stazy.test", "platform_admin", 0);
    let (target, _) = new_user("target@stazy.test");
    app.store.add_profile(target, "Tar Get", "target@stazy.test");

    let body = json!({ "email": "target@stazy.test", "admin_role": "super_admin" });
    let (status, _) =
        post_json_authed(&app.router, "/api/admin/roles", &body.to_string(), &token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.store.admin_roles.lock().unwrap().iter().all(|r| r.user_id != target));
}

#[tokio::test]
async fn lower_admins_cannot_grant() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Fin Ance", "fin@stazy.test", "finance_admin", 0);
    let (target, _) = new_user("target@stazy.test");
    app.store.add_profile(target, "Tar Get", "target@stazy.test");

    let body = json!({ "email": "target@stazy.test", "admin_role": "support_admin" });
    let (status, response) =
        post_json_authed(&app.router, "/api/admin/roles", &body.to_string(), &token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["message"], "Platform Admin role or higher required");
}

// ─── Remove admin ───────────────────────────────────────────────────────────

#[tokio::test]
async fn super_admin_rows_cannot_be_removed() {
    let app = test_app();
    let (_, root, token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);

    let (status, response) =
        delete_authed(&app.router, &format!("/api/admin/roles/{root}"), &token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["message"], "Super admin roles cannot be removed");
    assert_eq!(app.store.admin_roles.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn platform_admin_removes_lower_role() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Pat Form", "pat@stazy.test", "platform_admin", 0);
    let (mod_id, moderator, mod_token) =
        seed_admin(&app, "Mo Derator", "mod@stazy.test", "community_moderator", 1);

    let (status, body) =
        delete_authed(&app.router, &format!("/api/admin/roles/{moderator}"), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{:?}", body);
    assert!(app.store.admin_roles.lock().unwrap().iter().all(|r| r.user_id != mod_id));

    let (status, _) = get_authed(&app.router, "/api/admin/notifications", &mod_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "revocation applies to the next request");
}

#[tokio::test]
async fn removing_a_missing_row_is_not_found() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Rhea Root", "root@stazy.test", "super_admin", 0);

    let (status, _) =
        delete_authed(&app.router, &format!("/api/admin/roles/{}", Uuid::new_v4()), &token).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn support_admin_cannot_remove() {
    let app = test_app();
    let (_, _, token) = seed_admin(&app, "Sup Port", "sup@stazy.test", "support_admin", 0);
    let (_, city, _) = seed_admin(&app, "Cit Y", "city@stazy.test", "city_admin", 1);

    let (status, _) = delete_authed(&app.router, &format!("/api/admin/roles/{city}"), &token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.admin_roles.lock().unwrap().len(), 2);
}

// ─── Platform stats ─────────────────────────────────────────────────────────

#[tokio::test]
async fn platform_stats_count_listings_bookings_and_users() {
    let app = test_app_without_mailer();
    let (_, _, admin_token) = seed_admin(&app, "Sup Port", "sup@stazy.test", "support_admin", 0);
    let (owner_id, owner_token) = new_user("owner@stazy.test");
    app.store.add_profile(owner_id, "Own Er", "owner@stazy.test");
    let (tenant_id, tenant_token) = new_user("tenant@stazy.test");
    app.store.add_profile(tenant_id, "Ten Ant", "tenant@stazy.test");
    let loft = app.store.add_room(owner_id, "Loft", 8000.0, None);
    let cellar = app.store.add_room(owner_id, "Cellar", 3000.0, None);
    let attic = app.store.add_room(owner_id, "Attic", 6000.0, None);
    app.store.set_availability(attic.id, RoomAvailability::Maintenance);

    for room_id in [loft.id, cellar.id] {
        let body = json!({ "room_id": room_id }).to_string();
        let (status, _) = post_json_authed(&app.router, "/api/bookings", &body, &tenant_token).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, owned) = get_authed(&app.router, "/api/bookings/owner", &owner_token).await;
    let accepted = owned[0]["id"].as_str().expect("booking id").to_string();
    let uri = format!("/api/bookings/{accepted}/accept");
    let (status, _) = post_json_authed(&app.router, &uri, "", &owner_token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_authed(&app.router, "/api/admin/stats", &admin_token).await;

    assert_eq!(status, StatusCode::OK, "{:?}", body);
    assert_eq!(
        body,
        json!({
            "total_listings": 3,
            "active_listings": 2,
            "total_bookings": 2,
            "pending_bookings": 1,
            "total_users": 3
        })
    );
}

#[tokio::test]
async fn platform_stats_require_an_admin() {
    let app = test_app();
    let (_, tenant_token) = new_user("tenant@stazy.test");

    let (status, _) = get_authed(&app.router, "/api/admin/stats", &tenant_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&app.router, "/api/admin/stats").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
