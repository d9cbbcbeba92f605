//! Reservation lifecycle integration tests against an embedded database.
//! Run: cargo test -p reservation-server --test reservation_lifecycle

use chrono::{Duration, Utc};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use reservation_server::db::models::{User, UserCreate};
use reservation_server::db::repository::{NotificationRepository, UserRepository};
use reservation_server::reservations::ReservationService;
use reservation_server::services::Mailer;
use shared::ErrorCode;
use shared::client::{CreateReservationRequest, ReservationStatus};

async fn open_db(tmp: &tempfile::TempDir) -> Surreal<Db> {
    let db: Surreal<Db> = Surreal::new::<RocksDb>(tmp.path().join("test.db"))
        .await
        .unwrap();
    db.use_ns("reservations").use_db("main").await.unwrap();
    db
}

fn service(db: &Surreal<Db>) -> ReservationService {
    let mailer = Mailer::new(
        None,
        "Reservations <no-reply@localhost>".to_string(),
        "http://localhost:3000".to_string(),
    )
    .unwrap();
    ReservationService::new(db.clone(), mailer, chrono_tz::UTC)
}

async fn make_user(db: &Surreal<Db>, email: &str, phone: &str) -> User {
    UserRepository::new(db.clone())
        .create(UserCreate {
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password_hash: User::hash_password("hunter42").unwrap(),
            verification_token: None,
            is_verified: true,
        })
        .await
        .unwrap()
}

fn user_id(user: &User) -> String {
    user.id.as_ref().unwrap().to_string()
}

fn request(table_id: &str, date: &str, slot: &str) -> CreateReservationRequest {
    CreateReservationRequest {
        floorplan_id: "fp-main-hall".to_string(),
        table_id: table_id.to_string(),
        table_name: None,
        date: date.to_string(),
        time_slot: slot.to_string(),
        guests: 2,
        note: None,
    }
}

fn tomorrow() -> String {
    (Utc::now() + Duration::days(1)).format("%Y-%m-%d").to_string()
}

fn yesterday() -> String {
    (Utc::now() - Duration::days(1)).format("%Y-%m-%d").to_string()
}

/// Backdate a reservation so the approval sweep considers it due.
async fn backdate_created_at(db: &Surreal<Db>, id: &RecordId, millis_ago: i64) {
    let t = reservation_server::utils::time::now_millis() - millis_ago;
    db.query("UPDATE $id SET created_at = $t")
        .bind(("id", id.clone()))
        .bind(("t", t))
        .await
        .unwrap();
}

#[tokio::test]
async fn create_starts_pending_and_resolves_table_name() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;

    let created = svc
        .create(&user_id(&user), request("t3", &tomorrow(), "20:00"))
        .await
        .unwrap();

    assert_eq!(created.status, ReservationStatus::Pending);
    assert_eq!(created.table_name.as_deref(), Some("Main Hall · T3"));
    assert!(created.starts_at > reservation_server::utils::time::now_millis());
}

#[tokio::test]
async fn party_size_only_needs_to_be_positive() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;

    let mut req = request("t3", &tomorrow(), "20:00");
    req.guests = 200;

    // No upper bound on guests, only zero is rejected
    let created = svc.create(&user_id(&user), req).await.unwrap();
    assert_eq!(created.guests, 200);
}

#[tokio::test]
async fn only_active_reservations_block_the_slot() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;
    let date = tomorrow();

    let first = svc
        .create(&user_id(&user), request("t1", &date, "20:00"))
        .await
        .unwrap();

    // The first booking is still pending, so a second one goes through
    let _second = svc
        .create(&user_id(&user), request("t1", &date, "20:00"))
        .await
        .unwrap();

    // Once one of them is active the slot is taken
    assert!(svc.approve_pending(&first).await.unwrap());
    let err = svc
        .create(&user_id(&user), request("t1", &date, "20:00"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SlotConflict);

    // A different slot on the same table is fine
    svc.create(&user_id(&user), request("t1", &date, "21:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn approve_is_a_one_shot_transition() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;

    let created = svc
        .create(&user_id(&user), request("t2", &tomorrow(), "19:00"))
        .await
        .unwrap();

    assert!(svc.approve_pending(&created).await.unwrap());
    // Second attempt sees the record already active and does nothing
    assert!(!svc.approve_pending(&created).await.unwrap());

    // Exactly one notification despite the double call
    let notifications = NotificationRepository::new(db.clone())
        .find_by_reservation(created.id.as_ref().unwrap())
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message.contains("has been approved"));
}

#[tokio::test]
async fn approval_email_goes_out_once_with_the_booking_details() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let (mailer, outbox) = Mailer::capturing("http://localhost:3000");
    let svc = ReservationService::new(db.clone(), mailer, chrono_tz::UTC);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;
    let date = tomorrow();

    let created = svc
        .create(&user_id(&user), request("t2", &date, "19:00"))
        .await
        .unwrap();

    assert!(svc.approve_pending(&created).await.unwrap());
    assert!(!svc.approve_pending(&created).await.unwrap());

    // Exactly one email despite the double call, addressed to the owner
    // and carrying the table, date, slot and party size
    let sent = outbox.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ana@example.com");
    assert!(sent[0].subject.contains("confirmed"));
    assert!(sent[0].body.contains("Main Hall · T2"));
    assert!(sent[0].body.contains(&date));
    assert!(sent[0].body.contains("19:00"));
    assert!(sent[0].body.contains("(2 guests)"));
}

#[tokio::test]
async fn sweep_only_picks_up_reservations_older_than_the_delay() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;

    let young = svc
        .create(&user_id(&user), request("t1", &tomorrow(), "18:00"))
        .await
        .unwrap();
    let old = svc
        .create(&user_id(&user), request("t2", &tomorrow(), "18:00"))
        .await
        .unwrap();
    backdate_created_at(&db, old.id.as_ref().unwrap(), 31_000).await;

    assert_eq!(svc.process_pending().await.unwrap(), 1);

    let repo = svc.repository();
    let still_pending = repo
        .find_by_id(&young.id.as_ref().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_pending.status, ReservationStatus::Pending);

    let approved = repo
        .find_by_id(&old.id.as_ref().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.status, ReservationStatus::Active);
}

#[tokio::test]
async fn list_reconciles_past_reservations_and_builds_favorites() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;
    let uid = user_id(&user);
    let past = yesterday();

    // Two past visits to t5, one to t1, one upcoming booking
    let r1 = svc.create(&uid, request("t5", &past, "19:00")).await.unwrap();
    svc.create(&uid, request("t5", &past, "21:00")).await.unwrap();
    svc.create(&uid, request("t1", &past, "20:00")).await.unwrap();
    svc.create(&uid, request("t2", &tomorrow(), "20:00"))
        .await
        .unwrap();

    // Approving a past reservation still counts, finished wins at read time
    svc.approve_pending(&r1).await.unwrap();

    let (reservations, favorites) = svc.list(&uid).await.unwrap();
    assert_eq!(reservations.len(), 4);
    assert_eq!(
        reservations
            .iter()
            .filter(|r| r.status == ReservationStatus::Finished)
            .count(),
        3
    );

    assert_eq!(favorites.len(), 2);
    assert_eq!(favorites[0].table_id, "t5");
    assert_eq!(favorites[0].count, 2);
    assert_eq!(favorites[0].last_time_slot, "21:00");
    assert_eq!(favorites[1].table_id, "t1");

    // Idempotent: a second read flips nothing further
    let (again, _) = svc.list(&uid).await.unwrap();
    assert_eq!(
        again
            .iter()
            .filter(|r| r.status == ReservationStatus::Finished)
            .count(),
        3
    );
}

#[tokio::test]
async fn cancel_requires_ownership_but_not_a_particular_status() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let owner = make_user(&db, "ana@example.com", "+351900000001").await;
    let stranger = make_user(&db, "bob@example.com", "+351900000002").await;

    let created = svc
        .create(&user_id(&owner), request("t4", &tomorrow(), "20:00"))
        .await
        .unwrap();
    let rid = created.id.as_ref().unwrap().to_string();

    // Someone else's reservation looks like a missing one
    let err = svc.cancel(&user_id(&stranger), &rid).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ReservationNotFound);

    let cancelled = svc.cancel(&user_id(&owner), &rid).await.unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);

    // No prior-status validation: cancelling again, or cancelling a
    // finished reservation, goes through
    let again = svc.cancel(&user_id(&owner), &rid).await.unwrap();
    assert_eq!(again.status, ReservationStatus::Cancelled);

    svc.update_status(&rid, ReservationStatus::Finished)
        .await
        .unwrap();
    let reopened = svc.cancel(&user_id(&owner), &rid).await.unwrap();
    assert_eq!(reopened.status, ReservationStatus::Cancelled);
}

#[tokio::test]
async fn update_status_is_an_unrestricted_backdoor() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;

    let created = svc
        .create(&user_id(&user), request("t6", &tomorrow(), "20:00"))
        .await
        .unwrap();
    let rid = created.id.as_ref().unwrap().to_string();

    let finished = svc
        .update_status(&rid, ReservationStatus::Finished)
        .await
        .unwrap();
    assert_eq!(finished.status, ReservationStatus::Finished);

    // Even a backwards transition goes through
    let reopened = svc
        .update_status(&rid, ReservationStatus::Pending)
        .await
        .unwrap();
    assert_eq!(reopened.status, ReservationStatus::Pending);

    let err = svc
        .update_status("reservation:missing", ReservationStatus::Active)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ReservationNotFound);
}

#[tokio::test]
async fn cancelled_reservation_escapes_the_sweep() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;

    let created = svc
        .create(&user_id(&user), request("t7", &tomorrow(), "20:00"))
        .await
        .unwrap();
    backdate_created_at(&db, created.id.as_ref().unwrap(), 31_000).await;

    svc.cancel(&user_id(&user), &created.id.as_ref().unwrap().to_string())
        .await
        .unwrap();

    // The sweep finds nothing pending; no notification is ever created
    assert_eq!(svc.process_pending().await.unwrap(), 0);
    let notifications = NotificationRepository::new(db.clone())
        .find_by_reservation(created.id.as_ref().unwrap())
        .await
        .unwrap();
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn unread_notifications_are_marked_read_on_fetch() {
    let tmp = tempfile::tempdir().unwrap();
    let db = open_db(&tmp).await;
    let svc = service(&db);
    let user = make_user(&db, "ana@example.com", "+351900000001").await;

    let created = svc
        .create(&user_id(&user), request("t1", &tomorrow(), "20:00"))
        .await
        .unwrap();
    svc.approve_pending(&created).await.unwrap();

    let repo = NotificationRepository::new(db.clone());
    let uid = user.id.as_ref().unwrap();

    let unread = repo.find_unread(uid).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert!(!unread[0].read);

    repo.mark_read(unread.iter().filter_map(|n| n.id.clone()).collect())
        .await
        .unwrap();
    assert!(repo.find_unread(uid).await.unwrap().is_empty());
}
