use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;
use crate::form::SlotDraft;
use crate::payment::{detect_brand, validate_card, CardBrand, CardForm};
use crate::report::ValidationReport;
use crate::schedule::{
    bookable_slots, validate_with_source, BookableSlot, BookingRequest, Collection, CourtId, Minutes,
    SlotId, ValidationPolicy,
};
use crate::session::{AuthSession, Role};
use crate::store::{MemoryStore, SlotSource};

const TOKEN_KEY: &str = "token";

pub struct AppState {
    pub store: MemoryStore,
    pub booking_length: Minutes,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    token: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    subject: String,
    role: Role,
}

#[derive(Deserialize)]
pub struct ValidateRequest {
    draft: SlotDraft,
    #[serde(default)]
    editing_id: Option<SlotId>,
}

#[derive(Serialize)]
pub struct ValidationResponse {
    valid: bool,
    errors: ValidationReport,
}

impl From<ValidationReport> for ValidationResponse {
    fn from(errors: ValidationReport) -> Self {
        Self {
            valid: errors.is_valid(),
            errors,
        }
    }
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    date: NaiveDate,
    length: Option<Minutes>,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    date: NaiveDate,
    slots: Vec<BookableSlot>,
}

#[derive(Serialize)]
pub struct CardResponse {
    valid: bool,
    brand: Option<CardBrand>,
    errors: ValidationReport,
}

/// Reads the signed-in user from the session cookie. An expired or
/// unreadable token logs the user out.
fn current_session(session: &Session) -> Result<AuthSession, AppError> {
    let token = session
        .get::<String>(TOKEN_KEY)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or(AppError::Unauthorized)?;
    AuthSession::from_token(&token, Utc::now()).map_err(|err| {
        session.purge();
        AppError::from(err)
    })
}

fn require_manager(session: &Session) -> Result<AuthSession, AppError> {
    let auth = current_session(session)?;
    if !auth.can_manage_schedules() {
        return Err(AppError::Forbidden);
    }
    Ok(auth)
}

// Session endpoints
async fn login(req: web::Json<LoginRequest>, session: Session) -> Result<HttpResponse, AppError> {
    let LoginRequest { token } = req.into_inner();
    let auth = AuthSession::from_token(&token, Utc::now())?;
    session.renew();
    session
        .insert(TOKEN_KEY, token)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tracing::info!(subject = %auth.subject, role = ?auth.role, "signed in");
    Ok(HttpResponse::Ok().json(SessionResponse {
        subject: auth.subject,
        role: auth.role,
    }))
}

async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(serde_json::json!({"success": true}))
}

async fn get_session(session: Session) -> Result<HttpResponse, AppError> {
    let auth = current_session(&session)?;
    Ok(HttpResponse::Ok().json(SessionResponse {
        subject: auth.subject,
        role: auth.role,
    }))
}

// Schedule endpoints
async fn list_slots(court: web::Path<CourtId>, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let slots = state.store.fetch_slots(court.into_inner())?;
    Ok(HttpResponse::Ok().json(slots))
}

fn validate_in(
    collection: Collection,
    court_id: CourtId,
    req: ValidateRequest,
    state: &AppState,
) -> Result<HttpResponse, AppError> {
    let ValidateRequest { mut draft, editing_id } = req;
    draft.court_id = court_id;
    if draft.collection() != collection {
        return Err(AppError::BadRequest("draft kind does not match this collection".to_string()));
    }
    let report = validate_with_source(&state.store, &draft, editing_id, ValidationPolicy::for_collection(collection))?;
    Ok(HttpResponse::Ok().json(ValidationResponse::from(report)))
}

async fn validate_opening_hours(
    court: web::Path<CourtId>,
    req: web::Json<ValidateRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_manager(&session)?;
    validate_in(Collection::OpeningHours, court.into_inner(), req.into_inner(), &state)
}

async fn validate_tariffs(
    court: web::Path<CourtId>,
    req: web::Json<ValidateRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_manager(&session)?;
    validate_in(Collection::Tariffs, court.into_inner(), req.into_inner(), &state)
}

async fn create_slot(
    court: web::Path<CourtId>,
    draft: web::Json<SlotDraft>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_manager(&session)?;
    let mut draft = draft.into_inner();
    draft.court_id = court.into_inner();

    let policy = ValidationPolicy::for_collection(draft.collection());
    let report = validate_with_source(&state.store, &draft, None, policy)?;
    if !report.is_valid() {
        return Err(AppError::Invalid(report));
    }

    let slot = state.store.create_slot(draft.into_slot(None)?)?;
    Ok(HttpResponse::Created().json(slot))
}

async fn replace_slot(
    path: web::Path<(CourtId, SlotId)>,
    draft: web::Json<SlotDraft>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_manager(&session)?;
    let (court_id, id) = path.into_inner();
    let stored = state.store.get_slot(court_id, id)?;

    let mut draft = draft.into_inner();
    draft.court_id = court_id;
    if draft.collection() != stored.kind.collection() {
        return Err(AppError::BadRequest("a slot cannot change collection".to_string()));
    }

    let policy = ValidationPolicy::for_collection(draft.collection());
    let report = validate_with_source(&state.store, &draft, Some(id), policy)?;
    if !report.is_valid() {
        return Err(AppError::Invalid(report));
    }

    let slot = state.store.replace_slot(id, draft.into_slot(Some(id))?)?;
    Ok(HttpResponse::Ok().json(slot))
}

async fn delete_slot(
    path: web::Path<(CourtId, SlotId)>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_manager(&session)?;
    let (court_id, id) = path.into_inner();
    state.store.delete_slot(court_id, id)?;
    Ok(HttpResponse::NoContent().finish())
}

// Booking endpoints
async fn get_availability(
    court: web::Path<CourtId>,
    query: web::Query<AvailabilityQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let court_id = court.into_inner();
    let AvailabilityQuery { date, length } = query.into_inner();

    let slots = state.store.fetch_slots(court_id)?;
    let reservations = state.store.reservations(court_id, date)?;
    let length = length.unwrap_or(state.booking_length);

    Ok(HttpResponse::Ok().json(AvailabilityResponse {
        date,
        slots: bookable_slots(&slots, &reservations, date, length),
    }))
}

async fn create_reservation(
    court: web::Path<CourtId>,
    req: web::Json<BookingRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let auth = current_session(&session)?;
    if !auth.can_book() {
        return Err(AppError::Forbidden);
    }
    let reservation = state
        .store
        .book(court.into_inner(), &req, Utc::now().date_naive(), Some(auth.subject))?;
    Ok(HttpResponse::Created().json(reservation))
}

async fn validate_payment(form: web::Json<CardForm>) -> HttpResponse {
    let errors = validate_card(&form, Utc::now().date_naive());
    HttpResponse::Ok().json(CardResponse {
        valid: errors.is_valid(),
        brand: detect_brand(&form.number),
        errors,
    })
}

/// Registers the API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/login", web::post().to(login))
        .route("/api/logout", web::post().to(logout))
        .route("/api/session", web::get().to(get_session))
        .route("/api/payments/validate", web::post().to(validate_payment))
        .service(
            web::scope("/api/courts/{court}")
                .route("/slots", web::get().to(list_slots))
                .route("/slots", web::post().to(create_slot))
                .route("/slots/{id}", web::put().to(replace_slot))
                .route("/slots/{id}", web::delete().to(delete_slot))
                .route("/opening-hours/validate", web::post().to(validate_opening_hours))
                .route("/tariffs/validate", web::post().to(validate_tariffs))
                .route("/availability", web::get().to(get_availability))
                .route("/reservations", web::post().to(create_reservation)),
        );
}

pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(cookie_secure)
        .build()
}

pub async fn start_server(config: Config, store: MemoryStore) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        store,
        booking_length: config.booking.default_length,
    });
    let key = config.session.key();
    let cookie_secure = config.session.cookie_secure;
    let static_dir = config.server.static_dir.clone();

    tracing::info!("Starting web server on {}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(session_middleware(key.clone(), cookie_secure))
            .wrap(middleware::Logger::default())
            .configure(configure)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
