//! Single binary web server: roster and session control via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT. Admin endpoints need ADMIN_PASSWORD.
//! Optional: ROSTER_CSV, ROUND_LENGTH_SECS, WARN_SECS, MAX_COURTS, GROUPING_MODE, ROTATION_SEED.

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, patch, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use court_rotation_web::boundary::{
    parse_csv_players, BackgroundWriter, Cue, CueBoard, PasswordGate,
};
use court_rotation_web::ticker::{spawn_ticker, SharedOrchestrator, TickerHandle, TICK_PERIOD};
use court_rotation_web::{
    AdminGate, GroupingMode, InMemoryRoster, Player, PlayerFields, PlayerId, PlayerUpdate,
    RosterStore, Round, RoundError, RoundOrchestrator, RoundPhase, SessionConfig, SkillRating,
    StoreError,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Shared server state.
struct AppState {
    roster: Arc<InMemoryRoster>,
    orchestrator: SharedOrchestrator,
    ticker: Mutex<Option<TickerHandle>>,
    cues: Arc<CueBoard>,
    writer: Arc<BackgroundWriter>,
    admin: Option<PasswordGate>,
}

type State = Data<AppState>;

const ADMIN_SESSION_KEY: &str = "admin";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct PlayerBody {
    #[serde(default)]
    id: Option<PlayerId>,
    name: String,
    skill: u8,
    #[serde(default)]
    present: Option<bool>,
}

#[derive(Deserialize)]
struct PresenceBody {
    present: bool,
}

#[derive(Deserialize)]
struct ModeBody {
    mode: GroupingMode,
}

#[derive(Deserialize)]
struct PasswordBody {
    password: String,
}

#[derive(Deserialize)]
struct PlayerPath {
    id: PlayerId,
}

#[derive(Serialize)]
struct CueView {
    seq: u64,
    #[serde(flatten)]
    cue: Cue,
}

#[derive(Serialize)]
struct SessionView<'a> {
    phase: RoundPhase,
    round: Option<&'a Round>,
    remaining_secs: u32,
    config: &'a SessionConfig,
    cue: Option<CueView>,
}

fn error_json(msg: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": msg.to_string() })
}

fn store_error_response(e: &StoreError) -> HttpResponse {
    match e {
        StoreError::Validation(_) => HttpResponse::BadRequest().json(error_json(e)),
        StoreError::NotFound(_) => HttpResponse::NotFound().json(error_json(e)),
        StoreError::Configuration(_) => HttpResponse::ServiceUnavailable().json(error_json(e)),
        StoreError::Backend(_) => HttpResponse::InternalServerError().json(error_json(e)),
    }
}

fn round_error_response(e: &RoundError) -> HttpResponse {
    match e {
        RoundError::CannotGenerateRound { .. } => HttpResponse::Conflict().json(error_json(e)),
        RoundError::InvalidState { .. } => HttpResponse::BadRequest().json(error_json(e)),
        RoundError::Store(inner) => store_error_response(inner),
    }
}

fn session_response(state: &AppState, orch: &RoundOrchestrator) -> HttpResponse {
    let cue = state.cues.latest().map(|(seq, cue)| CueView { seq, cue });
    HttpResponse::Ok().json(SessionView {
        phase: orch.phase(),
        round: orch.current_round(),
        remaining_secs: orch.remaining_secs(),
        config: orch.config(),
        cue,
    })
}

macro_rules! lock_orchestrator {
    ($state:expr) => {
        match $state.orchestrator.lock() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        }
    };
}

/// Replace the running ticker with one bound to the orchestrator's current epoch.
fn restart_ticker(state: &AppState) {
    if let Ok(mut t) = state.ticker.lock() {
        if let Some(old) = t.take() {
            old.cancel();
        }
        *t = Some(spawn_ticker(Arc::clone(&state.orchestrator), TICK_PERIOD));
    }
}

fn stop_ticker(state: &AppState) {
    if let Ok(mut t) = state.ticker.lock() {
        if let Some(old) = t.take() {
            old.cancel();
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-rotation-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

#[get("/api/players")]
async fn api_list_players(state: State) -> HttpResponse {
    match state.roster.list() {
        Ok(players) => HttpResponse::Ok().json(players),
        Err(e) => store_error_response(&e),
    }
}

/// Add players, or edit name/skill/presence of existing ones (counters are kept).
#[post("/api/players")]
async fn api_upsert_players(state: State, body: Json<Vec<PlayerBody>>) -> HttpResponse {
    let existing = match state.roster.list() {
        Ok(players) => players,
        Err(e) => return store_error_response(&e),
    };
    let mut players = Vec::with_capacity(body.len());
    for b in body.into_inner() {
        let name = b.name.trim();
        if name.is_empty() {
            return HttpResponse::BadRequest().json(error_json("Player name must not be empty"));
        }
        let current = b.id.and_then(|id| existing.iter().find(|p| p.id == id));
        let mut p = match current {
            Some(p) => p.clone(),
            None => {
                let mut p = Player::new(name, b.skill);
                if let Some(id) = b.id {
                    p.id = id;
                }
                p
            }
        };
        p.name = name.to_string();
        p.skill = SkillRating::new(b.skill);
        if let Some(present) = b.present {
            p.present = present;
        }
        players.push(p);
    }
    match state.roster.upsert(players) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => store_error_response(&e),
    }
}

/// Batch field update. Accepts flat or nested (`fields`) records, single or array.
#[patch("/api/players")]
async fn api_update_players(state: State, body: Json<serde_json::Value>) -> HttpResponse {
    let updates = match PlayerUpdate::from_payloads(&body) {
        Ok(u) => u,
        Err(e) => return store_error_response(&e),
    };
    match state.roster.batch_update(&updates) {
        Ok(applied) => HttpResponse::Ok().json(serde_json::json!({ "applied": applied })),
        Err(e) => store_error_response(&e),
    }
}

#[delete("/api/players/{id}")]
async fn api_delete_player(state: State, path: Path<PlayerPath>) -> HttpResponse {
    match state.roster.delete(&[path.id]) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => store_error_response(&e),
    }
}

/// Check a player in or out.
#[put("/api/players/{id}/presence")]
async fn api_set_presence(state: State, path: Path<PlayerPath>, body: Json<PresenceBody>) -> HttpResponse {
    let update = PlayerUpdate {
        id: path.id,
        fields: PlayerFields {
            present: Some(body.present),
            ..PlayerFields::default()
        },
    };
    match state.roster.batch_update(&[update]) {
        Ok(0) => store_error_response(&StoreError::NotFound(path.id)),
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => store_error_response(&e),
    }
}

/// Import `name,skill[,present]` CSV rows as new players.
#[post("/api/players/import")]
async fn api_import_players(state: State, body: String) -> HttpResponse {
    let players = match parse_csv_players(body.as_bytes()) {
        Ok(p) => p,
        Err(e) => return store_error_response(&e),
    };
    match state.roster.upsert(players) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => store_error_response(&e),
    }
}

#[get("/api/session")]
async fn api_get_session(state: State) -> HttpResponse {
    let orch = lock_orchestrator!(state);
    session_response(&state, &orch)
}

/// Replace the session config (values are clamped into range).
#[put("/api/session/config")]
async fn api_set_config(state: State, body: Json<SessionConfig>) -> HttpResponse {
    let mut orch = lock_orchestrator!(state);
    orch.set_config(body.into_inner().sanitized());
    session_response(&state, &orch)
}

#[put("/api/session/mode")]
async fn api_set_mode(state: State, body: Json<ModeBody>) -> HttpResponse {
    let mut orch = lock_orchestrator!(state);
    orch.set_grouping_mode(body.mode);
    session_response(&state, &orch)
}

#[post("/api/session/start")]
async fn api_start(state: State) -> HttpResponse {
    let mut orch = lock_orchestrator!(state);
    let result = orch.start().map(|_| ());
    match result {
        Ok(()) => {
            drop(orch);
            restart_ticker(&state);
            let orch = lock_orchestrator!(state);
            session_response(&state, &orch)
        }
        Err(e) => {
            drop(orch);
            stop_ticker(&state);
            round_error_response(&e)
        }
    }
}

#[post("/api/session/pause")]
async fn api_pause(state: State) -> HttpResponse {
    let mut orch = lock_orchestrator!(state);
    match orch.pause() {
        Ok(()) => session_response(&state, &orch),
        Err(e) => round_error_response(&e),
    }
}

#[post("/api/session/resume")]
async fn api_resume(state: State) -> HttpResponse {
    let mut orch = lock_orchestrator!(state);
    match orch.resume() {
        Ok(()) => session_response(&state, &orch),
        Err(e) => round_error_response(&e),
    }
}

#[post("/api/session/end")]
async fn api_end(state: State) -> HttpResponse {
    let mut orch = lock_orchestrator!(state);
    orch.end();
    drop(orch);
    stop_ticker(&state);
    let orch = lock_orchestrator!(state);
    session_response(&state, &orch)
}

/// Skip to the next round now.
#[post("/api/session/next")]
async fn api_next(state: State) -> HttpResponse {
    let mut orch = lock_orchestrator!(state);
    let result = orch.manual_next().map(|_| ());
    match result {
        Ok(()) => session_response(&state, &orch),
        Err(e) => round_error_response(&e),
    }
}

#[post("/api/admin/login")]
async fn api_admin_login(state: State, session: Session, body: Json<PasswordBody>) -> HttpResponse {
    let gate = match &state.admin {
        Some(g) => g,
        None => return HttpResponse::ServiceUnavailable().json(error_json("Admin access is not configured")),
    };
    if !gate.verify(&body.password) {
        log::warn!("Rejected admin login");
        return HttpResponse::Unauthorized().json(error_json("Wrong password"));
    }
    if let Err(e) = session.insert(ADMIN_SESSION_KEY, true) {
        return HttpResponse::InternalServerError().json(error_json(e));
    }
    HttpResponse::NoContent().finish()
}

/// Zero every player's bench count and last played round.
#[post("/api/admin/reset-stats")]
async fn api_admin_reset_stats(state: State, session: Session) -> HttpResponse {
    if state.admin.is_none() {
        return HttpResponse::ServiceUnavailable().json(error_json("Admin access is not configured"));
    }
    if !matches!(session.get::<bool>(ADMIN_SESSION_KEY), Ok(Some(true))) {
        return HttpResponse::Unauthorized().json(error_json("Admin login required"));
    }
    let players = match state.roster.list() {
        Ok(p) => p,
        Err(e) => return store_error_response(&e),
    };
    let updates: Vec<PlayerUpdate> = players
        .iter()
        .map(|p| {
            let mut cleared = p.clone();
            cleared.reset_stats();
            PlayerUpdate {
                id: p.id,
                fields: PlayerFields {
                    bench_count: Some(cleared.bench_count),
                    last_played_round: Some(cleared.last_played_round),
                    ..PlayerFields::default()
                },
            }
        })
        .collect();
    // Queued under the lock so it lands after every earlier round batch.
    let done = {
        let mut orch = lock_orchestrator!(state);
        orch.clear_overlay();
        state.writer.submit_acked(updates)
    };
    let report = match done.await {
        Ok(r) => r,
        Err(_) => {
            return HttpResponse::ServiceUnavailable().json(error_json("Persistence worker stopped"))
        }
    };
    if !report.is_complete() {
        log::warn!("Admin reset left {} chunk(s) unwritten", report.failed_chunks.len());
    }
    let applied = report.applied;
    log::info!("Admin reset stats for {} player(s)", applied);
    HttpResponse::Ok().json(serde_json::json!({ "reset": applied }))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring unparsable {}={}", key, raw);
            None
        }
    }
}

fn config_from_env() -> SessionConfig {
    let defaults = SessionConfig::default();
    SessionConfig {
        round_length_secs: env_parse("ROUND_LENGTH_SECS").unwrap_or(defaults.round_length_secs),
        warn_secs: env_parse("WARN_SECS").unwrap_or(defaults.warn_secs),
        max_courts: env_parse("MAX_COURTS").unwrap_or(defaults.max_courts),
        grouping_mode: env_parse("GROUPING_MODE").unwrap_or(defaults.grouping_mode),
        seed: env_parse("ROTATION_SEED"),
    }
    .sanitized()
}

fn roster_from_env() -> InMemoryRoster {
    let path = match std::env::var("ROSTER_CSV") {
        Ok(p) => p,
        Err(_) => return InMemoryRoster::new(),
    };
    match InMemoryRoster::from_csv_path(&path) {
        Ok(roster) => {
            log::info!("Loaded roster from {}", path);
            roster
        }
        Err(e) => {
            log::error!("{}; starting with an empty roster", e);
            InMemoryRoster::new()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let admin = match PasswordGate::from_env() {
        Ok(gate) => Some(gate),
        Err(e) => {
            log::error!("{}; admin endpoints disabled", e);
            None
        }
    };

    let roster = Arc::new(roster_from_env());
    let cues = Arc::new(CueBoard::new());
    let writer = Arc::new(BackgroundWriter::new(roster.clone()));
    let orchestrator = RoundOrchestrator::new(
        config_from_env(),
        roster.clone(),
        writer.clone(),
        cues.clone(),
    );
    let state = Data::new(AppState {
        roster,
        orchestrator: Arc::new(Mutex::new(orchestrator)),
        ticker: Mutex::new(None),
        cues,
        writer,
        admin,
    });
    let session_key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .service(api_health)
            .service(favicon)
            .service(api_list_players)
            .service(api_upsert_players)
            .service(api_update_players)
            .service(api_import_players)
            .service(api_delete_player)
            .service(api_set_presence)
            .service(api_get_session)
            .service(api_set_config)
            .service(api_set_mode)
            .service(api_start)
            .service(api_pause)
            .service(api_resume)
            .service(api_end)
            .service(api_next)
            .service(api_admin_login)
            .service(api_admin_reset_stats)
    })
    .bind(bind)?
    .run()
    .await
}
