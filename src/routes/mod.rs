use axum::{
    handler::Handler,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{admin, auth, bookings, catalog, customers, drivers, locations, vehicles};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes
    let auth_routes = Router::new().route("/login", post(auth::login));

    // The caller's own account
    let me_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/change-password", post(auth::change_password))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Back-office routes (any authenticated account; deletions are admin only)
    let staff_routes = Router::new()
        .route(
            "/vehicles",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            get(vehicles::get_vehicle)
                .put(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle.layer(middleware::from_fn(require_admin))),
        )
        .route("/vehicles/{id}/status", patch(vehicles::update_vehicle_status))
        .route(
            "/vehicles/{id}/availability",
            get(vehicles::vehicle_availability),
        )
        .route("/categories", get(catalog::list_categories))
        .route("/sub-categories", get(catalog::list_sub_categories))
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(customers::get_customer).put(customers::update_customer),
        )
        .route(
            "/customers/{id}/status",
            get(customers::get_customer_status).patch(customers::update_customer_status),
        )
        .route(
            "/drivers",
            get(drivers::list_drivers).post(drivers::create_driver),
        )
        .route(
            "/drivers/{id}",
            get(drivers::get_driver).put(drivers::update_driver),
        )
        .route(
            "/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/bookings/{id}",
            get(bookings::get_booking)
                .delete(bookings::delete_booking.layer(middleware::from_fn(require_admin))),
        )
        .route("/bookings/{id}/status", patch(bookings::update_booking_status))
        .route("/bookings/{id}/returns", post(bookings::record_return))
        .route("/bookings/{id}/extensions", post(bookings::record_extension))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Account management (requires auth + admin role)
    let admin_routes = Router::new()
        .route(
            "/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route("/users/{id}", delete(admin::delete_user))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes.merge(me_routes))
        .nest("/api", staff_routes)
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
