//! Store behavior against a live Postgres. Every test returns early when
//! neither `TEST_DATABASE_URL` nor `DATABASE_URL` is set.

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::{Pool, Postgres};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use server::repo::PgStore;
use server::store::{BookingStore, NotificationStore, RoleStore, RoomStore, StatsStore};
use shared_types::{
    AdminRole, AppRole, BookingStatus, NewAdminRole, NewBooking, NewNotification,
    NotificationType, RoomAvailability,
};

/// Tests share one database; each holds this lock while it truncates and seeds.
static TEST_MUTEX: std::sync::LazyLock<Mutex<()>> = std::sync::LazyLock::new(|| Mutex::new(()));

async fn pg_store() -> Option<(PgStore, MutexGuard<'static, ()>)> {
    let guard = TEST_MUTEX.lock().await;
    let _ = dotenvy::dotenv();

    let Ok(database_url) =
        std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
    else {
        eprintln!("skipping Postgres store test: DATABASE_URL is not set");
        return None;
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    sqlx::query(
        "TRUNCATE admin_notifications, bookings, rooms, admin_roles, user_roles, profiles CASCADE",
    )
    .execute(&pool)
    .await
    .expect("Failed to truncate");

    Some((PgStore::new(pool), guard))
}

async fn seed_profile(pool: &Pool<Postgres>, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (id, full_name, email) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(email.split('@').next().unwrap_or(email))
        .bind(email)
        .execute(pool)
        .await
        .expect("Failed to seed profile");
    id
}

async fn seed_room(pool: &Pool<Postgres>, owner_id: Uuid, availability: RoomAvailability) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO rooms (owner_id, title, location_city, rent_amount, availability)
           VALUES ($1, 'Loft', 'Pune', 8000, $2)
           RETURNING id"#,
    )
    .bind(owner_id)
    .bind(availability.as_str())
    .fetch_one(pool)
    .await
    .expect("Failed to seed room")
}

async fn seed_notification(store: &PgStore, target_role: AdminRole, minutes_ago: i64) -> Uuid {
    let n = store
        .insert_notification(NewNotification {
            notification_type: NotificationType::BookingRequest,
            title: "New Booking Request".into(),
            message: format!("for {}", target_role.as_str()),
            data: json!({}),
            target_role,
        })
        .await
        .expect("insert notification");
    sqlx::query("UPDATE admin_notifications SET created_at = $2 WHERE id = $1")
        .bind(n.id)
        .bind(Utc::now() - Duration::minutes(minutes_ago))
        .execute(store.pool())
        .await
        .expect("Failed to backdate notification");
    n.id
}

// ─── Admin roles ────────────────────────────────────────────────────────────

#[tokio::test]
async fn super_admin_rows_survive_delete() {
    let Some((store, _guard)) = pg_store().await else { return };
    let root = seed_profile(store.pool(), "root@stazy.test").await;
    let finance = seed_profile(store.pool(), "fin@stazy.test").await;

    let root_row = store
        .insert_admin_role(NewAdminRole {
            user_id: root,
            admin_role: AdminRole::SuperAdmin,
            assigned_city: None,
        })
        .await
        .expect("insert super admin");
    let finance_row = store
        .insert_admin_role(NewAdminRole {
            user_id: finance,
            admin_role: AdminRole::FinanceAdmin,
            assigned_city: None,
        })
        .await
        .expect("insert finance admin");

    assert!(!store.delete_admin_role(root_row.id).await.expect("delete"));
    assert!(store.find_admin_role(root_row.id).await.expect("find").is_some());

    assert!(store.delete_admin_role(finance_row.id).await.expect("delete"));
    assert!(store.find_admin_role(finance_row.id).await.expect("find").is_none());
}

#[tokio::test]
async fn concurrent_signup_claims_insert_one_row() {
    let Some((store, _guard)) = pg_store().await else { return };
    let user = seed_profile(store.pool(), "racer@stazy.test").await;

    let other = store.clone();
    let (a, b) = tokio::join!(
        store.claim_signup_role(user, AppRole::Tenant),
        other.claim_signup_role(user, AppRole::PropertyOwner),
    );

    let claimed = [a.expect("claim"), b.expect("claim")];
    assert_eq!(claimed.iter().filter(|c| c.is_some()).count(), 1);
    assert_eq!(store.user_roles(user).await.expect("roles").len(), 1);
    assert!(store
        .claim_signup_role(user, AppRole::Tenant)
        .await
        .expect("claim")
        .is_none());
}

// ─── Bookings ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn status_update_only_applies_from_expected_state() {
    let Some((store, _guard)) = pg_store().await else { return };
    let owner = seed_profile(store.pool(), "owner@stazy.test").await;
    let tenant = seed_profile(store.pool(), "tenant@stazy.test").await;
    let room_id = seed_room(store.pool(), owner, RoomAvailability::Available).await;
    let room = store.find_room(room_id).await.expect("find").expect("room");

    let booking = store
        .insert_booking(NewBooking::for_room(&room, tenant, Utc::now().date_naive()))
        .await
        .expect("insert booking");
    assert_eq!(booking.status, BookingStatus::Pending);

    let confirmed = store
        .update_booking_status(booking.id, BookingStatus::Pending, BookingStatus::Confirmed)
        .await
        .expect("update");
    assert_eq!(confirmed.map(|b| b.status), Some(BookingStatus::Confirmed));

    let stale = store
        .update_booking_status(booking.id, BookingStatus::Pending, BookingStatus::Cancelled)
        .await
        .expect("update");
    assert!(stale.is_none(), "booking already left pending");

    let current = store.find_booking(booking.id).await.expect("find").expect("booking");
    assert_eq!(current.status, BookingStatus::Confirmed);
    assert_eq!(store.bookings_for_tenant(tenant).await.expect("list").len(), 1);
}

#[tokio::test]
async fn stats_count_rooms_bookings_and_profiles() {
    let Some((store, _guard)) = pg_store().await else { return };
    let owner = seed_profile(store.pool(), "owner@stazy.test").await;
    let tenant = seed_profile(store.pool(), "tenant@stazy.test").await;
    let open = seed_room(store.pool(), owner, RoomAvailability::Available).await;
    seed_room(store.pool(), owner, RoomAvailability::Occupied).await;
    let room = store.find_room(open).await.expect("find").expect("room");
    store
        .insert_booking(NewBooking::for_room(&room, tenant, Utc::now().date_naive()))
        .await
        .expect("insert booking");

    let stats = store.platform_stats().await.expect("stats");

    assert_eq!(stats.total_listings, 2);
    assert_eq!(stats.active_listings, 1);
    assert_eq!(stats.total_bookings, 1);
    assert_eq!(stats.pending_bookings, 1);
    assert_eq!(stats.total_users, 2);
    assert_eq!(store.rooms_for_owner(owner).await.expect("rooms").len(), 2);
}

// ─── Notifications ──────────────────────────────────────────────────────────

#[tokio::test]
async fn feed_filters_by_target_and_orders_newest_first() {
    let Some((store, _guard)) = pg_store().await else { return };
    let old = seed_notification(&store, AdminRole::SupportAdmin, 30).await;
    let hidden = seed_notification(&store, AdminRole::PlatformAdmin, 20).await;
    let new = seed_notification(&store, AdminRole::CityAdmin, 10).await;

    let visible = [AdminRole::SupportAdmin, AdminRole::CityAdmin];
    let feed = store.list_notifications(&visible, 50).await.expect("list");
    let ids: Vec<Uuid> = feed.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![new, old]);
    assert!(!ids.contains(&hidden));

    let capped = store.list_notifications(&visible, 1).await.expect("list");
    assert_eq!(capped.len(), 1);
}

#[tokio::test]
async fn mark_read_keeps_first_read_at() {
    let Some((store, _guard)) = pg_store().await else { return };
    let id = seed_notification(&store, AdminRole::SupportAdmin, 0).await;

    let first = store
        .mark_notification_read(id)
        .await
        .expect("mark")
        .expect("notification");
    assert!(first.is_read);
    let first_read_at = first.read_at.expect("read_at set");

    let second = store
        .mark_notification_read(id)
        .await
        .expect("mark")
        .expect("notification");
    assert_eq!(second.read_at, Some(first_read_at));

    assert!(store.mark_notification_read(Uuid::new_v4()).await.expect("mark").is_none());
}

#[tokio::test]
async fn mark_all_read_touches_only_visible_unread_rows() {
    let Some((store, _guard)) = pg_store().await else { return };
    let a = seed_notification(&store, AdminRole::SupportAdmin, 3).await;
    let b = seed_notification(&store, AdminRole::FinanceAdmin, 2).await;
    let hidden = seed_notification(&store, AdminRole::SuperAdmin, 1).await;

    let visible = [AdminRole::SupportAdmin, AdminRole::FinanceAdmin];
    assert_eq!(store.mark_all_notifications_read(&visible).await.expect("mark all"), 2);

    for id in [a, b] {
        let n = store.find_notification(id).await.expect("find").expect("notification");
        assert!(n.is_read);
        assert!(n.read_at.is_some());
    }
    let untouched = store.find_notification(hidden).await.expect("find").expect("notification");
    assert!(!untouched.is_read);
    assert!(untouched.read_at.is_none());

    assert_eq!(
        store.mark_all_notifications_read(&visible).await.expect("mark all"),
        0,
        "nothing left unread"
    );
}
