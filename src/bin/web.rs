//! Single binary web server: the tournament core behind a JSON API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT,
//! MAX_PLAYERS. Identity comes from AUTH_TOKENS (JSON: token -> principal),
//! themes from THEMES_JSON (JSON: id -> theme).
//!
//! All tournament state is in-memory by design; a restart clears it.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use list_clash_web::{
    gateway::Snapshot, logic, IdentityProvider, MatchId, Principal, RateLimiter, ThemeCatalog,
    ThemeSnapshot, Tournament, TournamentError, MAX_PLAYERS,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

/// Shared server state: the single tournament runtime plus its collaborators.
struct WebState {
    tournament: RwLock<Tournament>,
    limiter: Mutex<RateLimiter>,
    identity: BearerTokens,
    themes: StaticThemes,
}

type AppState = Data<WebState>;

/// Token-table identity provider: AUTH_TOKENS env holds a JSON map from
/// bearer token to principal. Stands in for a real identity service.
struct BearerTokens {
    tokens: HashMap<String, Principal>,
}

impl BearerTokens {
    fn from_env() -> Self {
        let tokens = std::env::var("AUTH_TOKENS")
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self { tokens }
    }
}

impl IdentityProvider for BearerTokens {
    fn authenticate(&self, token: &str) -> Option<Principal> {
        self.tokens.get(token).cloned()
    }
}

/// Theme catalog backed by THEMES_JSON env (JSON map id -> theme).
struct StaticThemes {
    themes: HashMap<String, ThemeSnapshot>,
}

impl StaticThemes {
    fn from_env() -> Self {
        let themes = std::env::var("THEMES_JSON")
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self { themes }
    }
}

impl ThemeCatalog for StaticThemes {
    fn find_theme(&self, theme_id: &str) -> Option<ThemeSnapshot> {
        self.themes.get(theme_id).cloned()
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct KickBody {
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Deserialize)]
struct ListBody {
    list: String,
}

#[derive(Deserialize)]
struct WinnerBody {
    #[serde(rename = "matchId")]
    match_id: MatchId,
    #[serde(rename = "winnerId")]
    winner_id: String,
}

/// Path segment: active match id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Resolve the caller from the Authorization header via the identity provider.
fn principal(state: &WebState, req: &HttpRequest) -> Option<Principal> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    state.identity.authenticate(token)
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::NotAuthorized => HttpResponse::Forbidden().json(body),
        TournamentError::RateLimited => HttpResponse::TooManyRequests().json(body),
        TournamentError::PlayerNotFound
        | TournamentError::MatchNotFound
        | TournamentError::ThemeNotFound => HttpResponse::NotFound().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Not signed in" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "list-clash-web",
    })
}

/// Polling endpoint: authenticated, rate-limited snapshot of roster + stats.
#[get("/api/tournament/stream")]
async fn api_stream(state: AppState, req: HttpRequest) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let allowed = match state.limiter.lock() {
        Ok(mut limiter) => limiter.check(&caller.user_id),
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if !allowed {
        return error_response(&TournamentError::RateLimited);
    }
    let g = match state.tournament.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(Snapshot {
        players: g.roster(),
        stats: g.stats(),
        timestamp: now_ms(),
    })
}

#[post("/api/tournament/join")]
async fn api_join(state: AppState, req: HttpRequest) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::join(&mut g, &caller, now_ms()) {
        Ok(()) => HttpResponse::Ok().json(g.stats()),
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournament/leave")]
async fn api_leave(state: AppState, req: HttpRequest) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::leave(&mut g, &caller) {
        Ok(()) => HttpResponse::Ok().json(g.stats()),
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournament/ready")]
async fn api_toggle_ready(state: AppState, req: HttpRequest) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::toggle_ready(&mut g, &caller) {
        Ok(is_ready) => HttpResponse::Ok().json(serde_json::json!({ "isReady": is_ready })),
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournament/kick")]
async fn api_kick(state: AppState, req: HttpRequest, body: Json<KickBody>) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::kick(&mut g, &caller, &body.user_id) {
        Ok(()) => HttpResponse::Ok().json(g.stats()),
        Err(e) => error_response(&e),
    }
}

/// Draw the bracket (admin). Safe to call twice: the second call returns the
/// existing bracket instead of reshuffling.
#[post("/api/tournament/draw")]
async fn api_draw(state: AppState, req: HttpRequest) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::draw_bracket(&mut g, &caller) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => error_response(&e),
    }
}

/// Reveal finished: Drawing -> Running (admin).
#[post("/api/tournament/finish-drawing")]
async fn api_finish_drawing(state: AppState, req: HttpRequest) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::finish_drawing(&mut g, &caller) {
        Ok(()) => HttpResponse::Ok().json(g.stats()),
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournament/reset")]
async fn api_reset(state: AppState, req: HttpRequest) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.reset(&caller) {
        Ok(()) => HttpResponse::Ok().json(g.stats()),
        Err(e) => error_response(&e),
    }
}

/// Bracket view: all matches, depth, champion if decided.
#[get("/api/tournament/bracket")]
async fn api_bracket(state: AppState, req: HttpRequest) -> HttpResponse {
    if principal(&state, &req).is_none() {
        return unauthorized();
    }
    let g = match state.tournament.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(serde_json::json!({
        "matches": g.bracket(),
        "totalRounds": g.total_rounds(),
        "status": g.status(),
        "champion": g.champion(),
    }))
}

/// Record a bracket match winner and advance them (admin).
#[put("/api/tournament/bracket/winner")]
async fn api_record_winner(state: AppState, req: HttpRequest, body: Json<WinnerBody>) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::record_winner(&mut g, &caller, &body.match_id, &body.winner_id) {
        Ok(()) => HttpResponse::Ok().json(g.bracket()),
        Err(e) => error_response(&e),
    }
}

/// Start a timed match between two drawn players (admin).
#[post("/api/matches")]
async fn api_start_match(
    state: AppState,
    req: HttpRequest,
    body: Json<logic::StartMatchRequest>,
) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::start_match(&mut g, &caller, &state.themes, &body, now_ms()) {
        Ok(match_id) => HttpResponse::Ok().json(serde_json::json!({ "matchId": match_id })),
        Err(e) => error_response(&e),
    }
}

#[post("/api/matches/{id}/countdown")]
async fn api_start_countdown(state: AppState, req: HttpRequest, path: Path<MatchPath>) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::start_countdown(&mut g, &caller, &path.id) {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => error_response(&e),
    }
}

/// Overwrite the caller's list text (participants only).
#[put("/api/matches/{id}/list")]
async fn api_update_list(
    state: AppState,
    req: HttpRequest,
    path: Path<MatchPath>,
    body: Json<ListBody>,
) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::update_player_list(&mut g, &caller, &path.id, body.into_inner().list, now_ms()) {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => error_response(&e),
    }
}

/// Match state with remaining clock (admin or participant).
#[get("/api/matches/{id}")]
async fn api_match_state(state: AppState, req: HttpRequest, path: Path<MatchPath>) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let mut g = match state.tournament.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::get_match_state(&mut g, &caller, &path.id, now_ms()) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

/// All active matches (admin dashboard).
#[get("/api/matches")]
async fn api_active_matches(state: AppState, req: HttpRequest) -> HttpResponse {
    let caller = match principal(&state, &req) {
        Some(p) => p,
        None => return unauthorized(),
    };
    let g = match state.tournament.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match logic::active_matches(&g, &caller) {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => error_response(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let max_players: usize = std::env::var("MAX_PLAYERS")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(MAX_PLAYERS);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{} (capacity {})", bind.0, bind.1, max_players);

    let identity = BearerTokens::from_env();
    if identity.tokens.is_empty() {
        log::warn!("AUTH_TOKENS is empty: every request will be rejected as unauthenticated");
    }

    let state = Data::new(WebState {
        tournament: RwLock::new(Tournament::with_capacity(max_players)),
        limiter: Mutex::new(RateLimiter::default()),
        identity,
        themes: StaticThemes::from_env(),
    });

    // Background task: every 2 minutes, drop idle users from the rate limiter
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(120));
        loop {
            interval.tick().await;
            if let Ok(mut limiter) = state_cleanup.limiter.lock() {
                limiter.cleanup(120_000);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_stream)
            .service(api_join)
            .service(api_leave)
            .service(api_toggle_ready)
            .service(api_kick)
            .service(api_draw)
            .service(api_finish_drawing)
            .service(api_reset)
            .service(api_bracket)
            .service(api_record_winner)
            .service(api_start_match)
            .service(api_start_countdown)
            .service(api_update_list)
            .service(api_active_matches)
            .service(api_match_state)
    })
    .bind(bind)?
    .run()
    .await
}
