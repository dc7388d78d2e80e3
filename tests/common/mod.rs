#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use fleet_rental_backend::{
    config::Config,
    db,
    entities::booking::{self, BookingStatus, DrivingType, FuelResponsibility, InsuranceType},
    entities::user::{self, UserRole},
    entities::vehicle::{self, FuelType, Transmission, VehicleStatus},
    entities::{booking_extension, customer, location, vehicle_category, vehicle_sub_category},
    handlers::auth::hash_password,
    routes,
    services::bookings::CreateBookingRequest,
    utils::jwt::create_token,
    AppState,
};

pub const ADMIN_EMAIL: &str = "admin@fleet360.test";
pub const STAFF_EMAIL: &str = "desk@fleet360.test";
pub const PASSWORD: &str = "password123";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_key_for_testing_purposes_only".to_string(),
        jwt_expiration_hours: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        availability_fail_closed: false,
        enforce_status_transitions: true,
        guard_booking_overlaps: true,
        rate_limit_per_second: 2,
        rate_limit_burst: 100,
        admin_email: ADMIN_EMAIL.to_string(),
        admin_password: PASSWORD.to_string(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn june(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap()
}

/// Rows every booking needs to point at
pub struct Fixtures {
    pub customer_id: i32,
    pub location_id: i32,
    pub category_id: i32,
    pub sub_category_id: i32,
    pub vehicle_id: i32,
}

/// Application state and router backed by a fresh in-memory SQLite database.
pub struct TestApp {
    pub state: AppState,
    router: Router,
    pub admin_token: String,
    pub staff_token: String,
    pub fixtures: Fixtures,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = db::connect_url(&config.database_url)
            .await
            .expect("failed to open test database");
        migration::Migrator::up(&db, None)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(db, config);

        let admin = seed_user(&state, ADMIN_EMAIL, UserRole::Admin).await;
        let staff = seed_user(&state, STAFF_EMAIL, UserRole::Staff).await;
        let secret = state.config.jwt_secret.clone();

        let fixtures = seed_fixtures(&state).await;

        Self {
            router: routes::create_router(state.clone()),
            admin_token: create_token(&admin, &secret, 1).unwrap(),
            staff_token: create_token(&staff, &secret, 1).unwrap(),
            state,
            fixtures,
        }
    }

    /// Send a request and decode the JSON envelope
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("router error during test request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, Some(&self.staff_token)).await
    }

    pub async fn add_vehicle(&self, registration_no: &str) -> vehicle::Model {
        insert_vehicle(&self.state, &self.fixtures, registration_no).await
    }

    /// Vehicle under a new category / sub-category pair with its own make and fuel
    pub async fn add_classified_vehicle(
        &self,
        registration_no: &str,
        category: &str,
        sub_category: &str,
        make: &str,
        fuel_type: FuelType,
    ) -> vehicle::Model {
        let category = vehicle_category::ActiveModel {
            name: Set(category.to_string()),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("seed category");
        let sub_category = vehicle_sub_category::ActiveModel {
            category_id: Set(category.id),
            name: Set(sub_category.to_string()),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("seed sub-category");

        let mut active: vehicle::ActiveModel = self.add_vehicle(registration_no).await.into();
        active.category_id = Set(category.id);
        active.sub_category_id = Set(sub_category.id);
        active.make = Set(make.to_string());
        active.fuel_type = Set(fuel_type);
        active.update(&self.state.db).await.expect("classify vehicle")
    }

    /// Insert a booking directly in the given status
    pub async fn insert_booking(
        &self,
        vehicle_id: i32,
        start: chrono::DateTime<Utc>,
        end: chrono::DateTime<Utc>,
        status: BookingStatus,
    ) -> booking::Model {
        let now = Utc::now();
        booking::ActiveModel {
            booking_date: Set(start.into()),
            return_date: Set(end.into()),
            pickup_location_id: Set(self.fixtures.location_id),
            dropoff_location_id: Set(self.fixtures.location_id),
            starting_odometer_reading: Set(12_000),
            is_return_to_same_location: Set(true),
            customer_id: Set(self.fixtures.customer_id),
            vehicle_id: Set(vehicle_id),
            driving_type: Set(DrivingType::SelfDrive),
            driver_id: Set(None),
            no_of_passengers: Set(2),
            fuel_responsibility: Set(FuelResponsibility::ByClient),
            deposited_amount: Set(dec!(200)),
            is_vat_applicable: Set(false),
            insurance_type: Set(InsuranceType::General),
            insurance_value: Set(None),
            discount_type: Set(None),
            discount: Set(None),
            total_amount: Set(dec!(750)),
            status: Set(status),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("seed booking")
    }

    pub async fn insert_extension(
        &self,
        booking_id: i32,
        original: NaiveDate,
        extended: NaiveDate,
    ) -> booking_extension::Model {
        booking_extension::ActiveModel {
            booking_id: Set(booking_id),
            original_return_date: Set(original),
            extend_return_date: Set(extended),
            no_of_extend_days: Set((extended - original).num_days() as i32),
            price: Set(dec!(100)),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("seed extension")
    }

    pub fn booking_request(
        &self,
        vehicle_id: i32,
        start: chrono::DateTime<Utc>,
        end: chrono::DateTime<Utc>,
    ) -> CreateBookingRequest {
        CreateBookingRequest {
            booking_date: start,
            return_date: end,
            pickup_location_id: self.fixtures.location_id,
            dropoff_location_id: self.fixtures.location_id,
            starting_odometer_reading: 12_000,
            is_return_to_same_location: true,
            customer_id: self.fixtures.customer_id,
            vehicle_id,
            driving_type: DrivingType::SelfDrive,
            driver_id: None,
            no_of_passengers: 2,
            fuel_responsibility: FuelResponsibility::ByClient,
            deposited_amount: dec!(200),
            is_vat_applicable: false,
            insurance_type: InsuranceType::Comprehensive,
            insurance_value: Some(dec!(50)),
            discount_type: None,
            discount: None,
            total_amount: dec!(750),
            add_ons: Vec::new(),
        }
    }
}

async fn seed_user(state: &AppState, email: &str, role: UserRole) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(PASSWORD).unwrap()),
        name: Set("Test User".to_string()),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.db)
    .await
    .expect("seed user")
}

async fn seed_fixtures(state: &AppState) -> Fixtures {
    let now = Utc::now();

    let category = vehicle_category::ActiveModel {
        name: Set("Car".to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("seed category");

    let sub_category = vehicle_sub_category::ActiveModel {
        category_id: Set(category.id),
        name: Set("Sedan".to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("seed sub-category");

    let customer = customer::ActiveModel {
        first_name: Set("Nimal".to_string()),
        last_name: Set("Perera".to_string()),
        user_name: Set("nperera".to_string()),
        email: Set("nimal@example.com".to_string()),
        contact_number: Set("0771234567".to_string()),
        address: Set("12 Lake Road, Colombo".to_string()),
        nic: Set("901234567V".to_string()),
        passport_number: Set(None),
        nationality: Set("Sri Lankan".to_string()),
        country: Set("Sri Lanka".to_string()),
        driving_licence_number: Set(Some("B1234567".to_string())),
        status: Set(customer::CustomerStatus::Active),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("seed customer");

    let location = location::ActiveModel {
        name: Set("Airport".to_string()),
        address: Set("Katunayake".to_string()),
        created_at: Set(now.into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("seed location");

    let mut fixtures = Fixtures {
        customer_id: customer.id,
        location_id: location.id,
        category_id: category.id,
        sub_category_id: sub_category.id,
        vehicle_id: 0,
    };
    fixtures.vehicle_id = insert_vehicle(state, &fixtures, "CAB-1234").await.id;
    fixtures
}

async fn insert_vehicle(state: &AppState, fixtures: &Fixtures, registration_no: &str) -> vehicle::Model {
    let now = Utc::now();
    vehicle::ActiveModel {
        category_id: Set(fixtures.category_id),
        sub_category_id: Set(fixtures.sub_category_id),
        vehicle_name: Set("Axio".to_string()),
        engine_capacity: Set(1500),
        fuel_type: Set(FuelType::Hybrid),
        color: Set("White".to_string()),
        make: Set("Toyota".to_string()),
        model: Set("Axio".to_string()),
        transmission: Set(Transmission::Auto),
        price_per_day: Set(dec!(150)),
        no_of_seats: Set(5),
        insurance_no: Set(format!("INS-{}", registration_no)),
        insurance_expiry: Set(date(2026, 12, 31)),
        registration_no: Set(registration_no.to_string()),
        vin: Set(format!("VIN-{}", registration_no)),
        description: Set(None),
        base_km_per_day: Set(100),
        excess_km_charge: Set(dec!(0.5)),
        registration_expiry: Set(date(2026, 12, 31)),
        deposit_amount: Set(dec!(200)),
        vat_amount: Set(Decimal::ZERO),
        odometer_reading: Set(12_000),
        late_fee: Set(dec!(25)),
        is_under_maintenance: Set(false),
        status: Set(VehicleStatus::Available),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("seed vehicle")
}
