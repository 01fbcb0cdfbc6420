use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug, warn};

use care_link_domain::auth::auth_middleware;
use care_link_domain::storage::PUBLIC_PREFIX;

use crate::api::handlers::{
    appointments, auth, doctors, health, health_records, medications, messages, patients, prescriptions,
    reminders, symptom_diary,
};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Room for multipart boundaries and the other form fields
const UPLOAD_FORM_OVERHEAD: usize = 1024 * 1024;

/// Where static files come from and who may call the API from a browser
#[derive(Debug, Clone)]
pub struct RouterConfig<'a> {
    pub upload_dir: &'a Path,
    pub cors_origins: &'a [String],
}

/// Create the application router
pub fn create_router(state: AppState, config: RouterConfig<'_>) -> Router {
    debug!("Creating application router");

    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let upload_routes = Router::new()
        .route(
            "/api/health-records",
            get(health_records::list_health_records).post(health_records::upload_health_record),
        )
        .layer(DefaultBodyLimit::max(state.max_upload_size + UPLOAD_FORM_OVERHEAD));

    // Define specific routes before parametrized routes
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me).delete(auth::delete_me))
        .route(
            "/api/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            put(appointments::update_appointment_status).delete(appointments::delete_appointment),
        )
        .route(
            "/api/medications",
            get(medications::list_medications).post(medications::create_medication),
        )
        .route(
            "/api/medications/:id",
            get(medications::get_medication)
                .put(medications::update_medication)
                .delete(medications::delete_medication),
        )
        .route("/api/messages", get(messages::list_messages).post(messages::send_message))
        .route("/api/messages/chat/:user_id", get(messages::chat_history))
        .route("/api/messages/:id/read", put(messages::mark_message_read))
        .route(
            "/api/prescriptions",
            get(prescriptions::list_prescriptions).post(prescriptions::create_prescription),
        )
        .route("/api/reminders", get(reminders::list_reminders).post(reminders::create_reminder))
        .route(
            "/api/reminders/:id",
            put(reminders::update_reminder).delete(reminders::delete_reminder),
        )
        .route(
            "/api/symptom-diary",
            get(symptom_diary::list_symptom_entries).post(symptom_diary::create_symptom_entry),
        )
        .route("/api/symptom-diary/:id", axum::routing::delete(symptom_diary::delete_symptom_entry))
        .route("/api/health-records/:id", axum::routing::delete(health_records::delete_health_record))
        .route("/api/doctors/patients", get(doctors::list_patients))
        .route("/api/doctors/patient/:patient_id/records", get(doctors::patient_records))
        .route("/api/patients/dashboard", get(patients::dashboard))
        .merge(upload_routes)
        .layer(middleware::from_fn_with_state(state.credentials.clone(), auth_middleware));

    debug!("API routes configured");

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(config.upload_dir))
        .merge(configure_swagger_routes())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors_layer(config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| {
            let wildcard = origin.as_str() == "*";
            if wildcard {
                warn!("Ignoring wildcard CORS origin, credentials require explicit origins");
            }
            !wildcard
        })
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
