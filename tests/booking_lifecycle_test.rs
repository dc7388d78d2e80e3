mod common;

use common::{date, june, TestApp};
use fleet_rental_backend::entities::booking::{self, BookingStatus};
use fleet_rental_backend::error::AppError;
use fleet_rental_backend::services::availability::{self, DateWindow};
use fleet_rental_backend::services::bookings::{
    self, AddOnRequest, RecordExtensionRequest, RecordReturnRequest,
};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

fn return_request(final_odometer: i32) -> RecordReturnRequest {
    RecordReturnRequest {
        return_date: date(2024, 6, 15),
        final_odometer_reading: final_odometer,
        is_damage: false,
        damage_notes: None,
        refunded_deposit_amount: dec!(200),
        total_amount: dec!(750),
    }
}

#[tokio::test]
async fn create_booking_starts_pending_with_add_ons() {
    let app = TestApp::new().await;
    let mut request = app.booking_request(app.fixtures.vehicle_id, june(10), june(15));
    request.add_ons = vec![
        AddOnRequest {
            add_on_name: "Child seat".to_string(),
            add_on_price: dec!(15),
        },
        AddOnRequest {
            add_on_name: "GPS".to_string(),
            add_on_price: dec!(10),
        },
    ];

    let (booking, add_ons) = bookings::create_booking(&app.state, request).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(add_ons.len(), 2);
    assert!(add_ons.iter().all(|a| a.booking_id == booking.id));
}

#[tokio::test]
async fn create_booking_validates_references_and_dates() {
    let app = TestApp::new().await;

    let mut request = app.booking_request(app.fixtures.vehicle_id, june(10), june(15));
    request.customer_id = 9_999;
    let err = bookings::create_booking(&app.state, request).await.unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("customer_id")));

    let mut request = app.booking_request(app.fixtures.vehicle_id, june(10), june(15));
    request.driver_id = Some(42);
    let err = bookings::create_booking(&app.state, request).await.unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("driver_id")));

    let request = app.booking_request(app.fixtures.vehicle_id, june(15), june(15));
    let err = bookings::create_booking(&app.state, request).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let stored = booking::Entity::find().all(&app.state.db).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn create_booking_rejects_an_overlapping_active_reservation() {
    let app = TestApp::new().await;
    let vehicle_id = app.fixtures.vehicle_id;
    app.insert_booking(vehicle_id, june(10), june(15), BookingStatus::Confirmed)
        .await;

    let err = bookings::create_booking(&app.state, app.booking_request(vehicle_id, june(14), june(18)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Back to back is fine
    bookings::create_booking(&app.state, app.booking_request(vehicle_id, june(16), june(18)))
        .await
        .unwrap();
}

#[tokio::test]
async fn overlap_guard_can_be_switched_off() {
    let mut config = common::test_config();
    config.guard_booking_overlaps = false;
    let app = TestApp::with_config(config).await;
    let vehicle_id = app.fixtures.vehicle_id;
    app.insert_booking(vehicle_id, june(10), june(15), BookingStatus::Confirmed)
        .await;

    let (second, _) =
        bookings::create_booking(&app.state, app.booking_request(vehicle_id, june(12), june(14)))
            .await
            .unwrap();
    let confirmed = bookings::update_status(&app.state, second.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn return_is_recorded_once_and_leaves_status_alone() {
    let app = TestApp::new().await;
    let booking = app
        .insert_booking(app.fixtures.vehicle_id, june(10), june(15), BookingStatus::Ongoing)
        .await;

    let record = bookings::record_return(&app.state, booking.id, return_request(12_450))
        .await
        .unwrap();
    assert_eq!(record.booking_id, booking.id);
    assert_eq!(record.final_odometer_reading, 12_450);

    let err = bookings::record_return(&app.state, booking.id, return_request(12_500))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let stored = bookings::find_booking(&app.state.db, booking.id).await.unwrap();
    assert_eq!(stored.status, BookingStatus::Ongoing);
}

#[tokio::test]
async fn return_requires_an_existing_booking_and_sane_odometer() {
    let app = TestApp::new().await;

    let err = bookings::record_return(&app.state, 404, return_request(12_450))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let booking = app
        .insert_booking(app.fixtures.vehicle_id, june(10), june(15), BookingStatus::Ongoing)
        .await;
    let err = bookings::record_return(&app.state, booking.id, return_request(11_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn extension_is_appended_without_touching_return_date() {
    let app = TestApp::new().await;
    let booking = app
        .insert_booking(app.fixtures.vehicle_id, june(10), june(15), BookingStatus::Confirmed)
        .await;

    let extension = bookings::record_extension(
        &app.state,
        booking.id,
        RecordExtensionRequest {
            original_return_date: date(2024, 6, 15),
            extend_return_date: date(2024, 6, 25),
            no_of_extend_days: 10,
            price: dec!(1500),
        },
    )
    .await
    .unwrap();
    assert_eq!(extension.extend_return_date, date(2024, 6, 25));

    let stored = bookings::find_booking(&app.state.db, booking.id).await.unwrap();
    assert_eq!(stored.return_date, booking.return_date);
}

#[tokio::test]
async fn extension_validates_dates_and_collisions() {
    let app = TestApp::new().await;
    let vehicle_id = app.fixtures.vehicle_id;
    let first = app
        .insert_booking(vehicle_id, june(10), june(15), BookingStatus::Confirmed)
        .await;
    app.insert_booking(vehicle_id, june(20), june(25), BookingStatus::Confirmed)
        .await;

    let backwards = RecordExtensionRequest {
        original_return_date: date(2024, 6, 15),
        extend_return_date: date(2024, 6, 14),
        no_of_extend_days: 1,
        price: dec!(100),
    };
    let err = bookings::record_extension(&app.state, first.id, backwards)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let into_next = RecordExtensionRequest {
        original_return_date: date(2024, 6, 15),
        extend_return_date: date(2024, 6, 22),
        no_of_extend_days: 7,
        price: dec!(700),
    };
    let err = bookings::record_extension(&app.state, first.id, into_next)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn extension_cannot_move_the_end_before_the_booking() {
    let app = TestApp::new().await;
    let vehicle_id = app.fixtures.vehicle_id;
    let booking = app
        .insert_booking(vehicle_id, june(10), june(15), BookingStatus::Confirmed)
        .await;
    let query = Some(DateWindow::new(date(2024, 6, 11), date(2024, 6, 13)));

    let err = bookings::record_extension(
        &app.state,
        booking.id,
        RecordExtensionRequest {
            original_return_date: date(2024, 6, 1),
            extend_return_date: date(2024, 6, 5),
            no_of_extend_days: 4,
            price: dec!(400),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    assert!(!availability::is_available(&app.state.db, vehicle_id, query).await.unwrap());
    let err = bookings::create_booking(
        &app.state,
        app.booking_request(vehicle_id, june(11), june(13)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn extensions_chain_from_the_current_end() {
    let app = TestApp::new().await;
    let booking = app
        .insert_booking(app.fixtures.vehicle_id, june(10), june(15), BookingStatus::Confirmed)
        .await;
    let extend = |original, extended| RecordExtensionRequest {
        original_return_date: original,
        extend_return_date: extended,
        no_of_extend_days: 3,
        price: dec!(300),
    };

    bookings::record_extension(&app.state, booking.id, extend(date(2024, 6, 15), date(2024, 6, 18)))
        .await
        .unwrap();

    // The booking now ends on the 18th, so the 15th is stale
    let err = bookings::record_extension(
        &app.state,
        booking.id,
        extend(date(2024, 6, 15), date(2024, 6, 21)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let extension = bookings::record_extension(
        &app.state,
        booking.id,
        extend(date(2024, 6, 18), date(2024, 6, 21)),
    )
    .await
    .unwrap();
    assert_eq!(extension.original_return_date, date(2024, 6, 18));

    let window = availability::effective_window(&app.state.db, &booking).await.unwrap();
    assert_eq!(window.dropoff, date(2024, 6, 21));
}

#[tokio::test]
async fn status_follows_the_happy_path() {
    let app = TestApp::new().await;
    let (booking, _) = bookings::create_booking(
        &app.state,
        app.booking_request(app.fixtures.vehicle_id, june(10), june(15)),
    )
    .await
    .unwrap();

    for next in [
        BookingStatus::Confirmed,
        BookingStatus::Ongoing,
        BookingStatus::Completed,
    ] {
        let updated = bookings::update_status(&app.state, booking.id, next).await.unwrap();
        assert_eq!(updated.status, next);
    }
}

#[tokio::test]
async fn illegal_transitions_are_rejected() {
    let app = TestApp::new().await;
    let booking = app
        .insert_booking(app.fixtures.vehicle_id, june(10), june(15), BookingStatus::Completed)
        .await;

    let err = bookings::update_status(&app.state, booking.id, BookingStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Pending
        }
    ));

    // Same status is a no-op
    let same = bookings::update_status(&app.state, booking.id, BookingStatus::Completed)
        .await
        .unwrap();
    assert_eq!(same.status, BookingStatus::Completed);
}

#[tokio::test]
async fn unchecked_transitions_when_enforcement_is_off() {
    let mut config = common::test_config();
    config.enforce_status_transitions = false;
    let app = TestApp::with_config(config).await;
    let booking = app
        .insert_booking(app.fixtures.vehicle_id, june(10), june(15), BookingStatus::Completed)
        .await;

    let updated = bookings::update_status(&app.state, booking.id, BookingStatus::Pending)
        .await
        .unwrap();
    assert_eq!(updated.status, BookingStatus::Pending);
}

#[tokio::test]
async fn confirming_an_overlapping_booking_conflicts() {
    let app = TestApp::new().await;
    let vehicle_id = app.fixtures.vehicle_id;
    let (first, _) = bookings::create_booking(&app.state, app.booking_request(vehicle_id, june(10), june(15)))
        .await
        .unwrap();
    let (second, _) = bookings::create_booking(&app.state, app.booking_request(vehicle_id, june(13), june(18)))
        .await
        .unwrap();

    bookings::update_status(&app.state, first.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    let err = bookings::update_status(&app.state, second.id, BookingStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Cancelling is not an active status and skips the check
    bookings::update_status(&app.state, second.id, BookingStatus::Cancelled)
        .await
        .unwrap();
}

#[tokio::test]
async fn concurrent_confirmations_admit_only_one() {
    let app = TestApp::new().await;
    let vehicle_id = app.fixtures.vehicle_id;
    let (first, _) = bookings::create_booking(&app.state, app.booking_request(vehicle_id, june(10), june(15)))
        .await
        .unwrap();
    let (second, _) = bookings::create_booking(&app.state, app.booking_request(vehicle_id, june(12), june(16)))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        bookings::update_status(&app.state, first.id, BookingStatus::Confirmed),
        bookings::update_status(&app.state, second.id, BookingStatus::Confirmed),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let rejected = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(rejected, AppError::Conflict(_)));
}
