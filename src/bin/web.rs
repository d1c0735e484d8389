//! Single binary web server: JSON API over the in-memory tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).
//! The organizer is identified by the `X-User` request header.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use beer_pong_tournament::models::Result;
use beer_pong_tournament::{
    add_table, add_team, delete_table, delete_team, generate_ko_matches,
    generate_qualification_matches, import_teams_csv, ko_tree, mark_team_ready,
    qualification_match_views, queued_ko_matches, queued_qualification_matches, rename_table,
    rename_team, score_table, signup_team, team_views, tournament_overview, update_ko_standing,
    update_qualification_match, update_tournament, ErrorKind, KoStandingUpdate, MatchId,
    QualificationMatchUpdate, QualificationMatchView, StandingId, TableId, TeamId, Tournament,
    TournamentError, TournamentId, TournamentUpdate,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory state: every tournament aggregate by id. The write lock is the transaction boundary.
type AppState = Data<RwLock<HashMap<TournamentId, Tournament>>>;

const USER_HEADER: &str = "X-User";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    registration_end: DateTime<Utc>,
    max_participants: u32,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct SignupBody {
    access_token: Uuid,
    name: String,
}

#[derive(Deserialize)]
struct GenerateKoBody {
    team_ids: Vec<TeamId>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TeamPath {
    id: TournamentId,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct StandingPath {
    id: TournamentId,
    standing_id: StandingId,
}

#[derive(Deserialize)]
struct TablePath {
    id: TournamentId,
    table_id: TableId,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::AccessDenied => HttpResponse::Forbidden().json(body),
        ErrorKind::PreconditionFailed => HttpResponse::PreconditionFailed().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::InvariantViolation => HttpResponse::InternalServerError().json(body),
    }
}

fn current_user(req: &HttpRequest) -> String {
    req.headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Run a read-only operation against one tournament under the shared lock.
fn read_tournament<T, F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&Tournament) -> Result<T>,
{
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let result = g
        .get(&id)
        .ok_or(TournamentError::TournamentNotFound(id))
        .and_then(f);
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

/// Run a mutating operation against one tournament under the exclusive lock.
fn write_tournament<T, F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&mut Tournament) -> Result<T>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let result = g
        .get_mut(&id)
        .ok_or(TournamentError::TournamentNotFound(id))
        .and_then(f);
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            log::debug!("Request on tournament {} rejected: {}", id, e);
            error_response(&e)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "beer-pong-tournament",
    })
}

/// Create a tournament organized by the requesting user.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    req: HttpRequest,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let tournament = match Tournament::new(
        body.name,
        body.registration_end,
        body.max_participants,
        body.description,
        current_user(&req),
        Utc::now(),
    ) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    log::info!("Created tournament {}", tournament.id);
    let response = HttpResponse::Ok().json(tournament_overview(&tournament));
    g.insert(tournament.id, tournament);
    response
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_tournament(&state, path.id, |t| Ok(tournament_overview(t)))
}

#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<TournamentUpdate>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| {
        update_tournament(t, &user, body.into_inner(), Utc::now())?;
        Ok(tournament_overview(t))
    })
}

#[get("/api/tournaments/{id}/teams")]
async fn api_list_teams(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_tournament(&state, path.id, |t| Ok(team_views(t)))
}

/// Register a team as organizer.
#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| add_team(t, &user, &body.name, Utc::now()))
}

/// Self-signup with the public access token; no user header required.
#[post("/api/tournaments/{id}/signup")]
async fn api_signup_team(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SignupBody>,
) -> HttpResponse {
    write_tournament(&state, path.id, |t| {
        signup_team(t, body.access_token, &body.name, Utc::now())
    })
}

/// Bulk import: request body is CSV text with a `name` header.
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: String,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| {
        import_teams_csv(t, &user, body.as_bytes(), Utc::now())
    })
}

#[put("/api/tournaments/{id}/teams/{team_id}")]
async fn api_rename_team(
    state: AppState,
    req: HttpRequest,
    path: Path<TeamPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| {
        rename_team(t, &user, path.team_id, &body.name)
    })
}

#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_delete_team(state: AppState, req: HttpRequest, path: Path<TeamPath>) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| delete_team(t, &user, path.team_id))
}

/// Check a team in.
#[post("/api/tournaments/{id}/teams/{team_id}/ready")]
async fn api_mark_team_ready(
    state: AppState,
    req: HttpRequest,
    path: Path<TeamPath>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| {
        mark_team_ready(t, &user, path.team_id, Utc::now())
    })
}

#[post("/api/tournaments/{id}/qualification-matches")]
async fn api_generate_qualification(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| {
        generate_qualification_matches(t, &user)?;
        Ok(qualification_match_views(t))
    })
}

#[get("/api/tournaments/{id}/qualification-matches")]
async fn api_list_qualification(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_tournament(&state, path.id, |t| Ok(qualification_match_views(t)))
}

#[get("/api/tournaments/{id}/qualification-matches/queued")]
async fn api_queued_qualification(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_tournament(&state, path.id, |t| Ok(queued_qualification_matches(t)))
}

#[put("/api/tournaments/{id}/qualification-matches/{match_id}")]
async fn api_update_qualification(
    state: AppState,
    req: HttpRequest,
    path: Path<MatchPath>,
    body: Json<QualificationMatchUpdate>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| {
        update_qualification_match(t, &user, path.match_id, body.into_inner(), Utc::now())?;
        let m = t.qualification_match(path.match_id)?;
        Ok(QualificationMatchView::new(t, m))
    })
}

#[get("/api/tournaments/{id}/score-table")]
async fn api_score_table(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_tournament(&state, path.id, |t| Ok(score_table(t)))
}

#[post("/api/tournaments/{id}/ko-matches")]
async fn api_generate_ko(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<GenerateKoBody>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| {
        generate_ko_matches(t, &user, &body.team_ids)?;
        ko_tree(t)
    })
}

#[get("/api/tournaments/{id}/ko-matches")]
async fn api_ko_tree(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_tournament(&state, path.id, ko_tree)
}

#[get("/api/tournaments/{id}/ko-matches/queued")]
async fn api_queued_ko(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_tournament(&state, path.id, |t| Ok(queued_ko_matches(t)))
}

#[put("/api/tournaments/{id}/ko-matches/{standing_id}")]
async fn api_update_ko_standing(
    state: AppState,
    req: HttpRequest,
    path: Path<StandingPath>,
    body: Json<KoStandingUpdate>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| {
        update_ko_standing(t, &user, path.standing_id, body.into_inner(), Utc::now())?;
        ko_tree(t)
    })
}

#[get("/api/tournaments/{id}/tables")]
async fn api_list_tables(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_tournament(&state, path.id, |t| Ok(t.tables.clone()))
}

#[post("/api/tournaments/{id}/tables")]
async fn api_add_table(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| add_table(t, &user, &body.name))
}

#[put("/api/tournaments/{id}/tables/{table_id}")]
async fn api_rename_table(
    state: AppState,
    req: HttpRequest,
    path: Path<TablePath>,
    body: Json<NameBody>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| {
        rename_table(t, &user, path.table_id, &body.name)
    })
}

#[delete("/api/tournaments/{id}/tables/{table_id}")]
async fn api_delete_table(
    state: AppState,
    req: HttpRequest,
    path: Path<TablePath>,
) -> HttpResponse {
    let user = current_user(&req);
    write_tournament(&state, path.id, |t| delete_table(t, &user, path.table_id))
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
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, Tournament>::new()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_update_tournament)
            .service(api_list_teams)
            .service(api_add_team)
            .service(api_signup_team)
            .service(api_import_teams)
            .service(api_rename_team)
            .service(api_delete_team)
            .service(api_mark_team_ready)
            .service(api_generate_qualification)
            .service(api_list_qualification)
            .service(api_queued_qualification)
            .service(api_update_qualification)
            .service(api_score_table)
            .service(api_generate_ko)
            .service(api_ko_tree)
            .service(api_queued_ko)
            .service(api_update_ko_standing)
            .service(api_list_tables)
            .service(api_add_table)
            .service(api_rename_table)
            .service(api_delete_table)
    })
    .bind(bind)?
    .run()
    .await
}
