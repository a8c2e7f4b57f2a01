use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use registrar_api::{AppState, AppStateInner, auth, chat, pages::Pages, session, students, uploads};
use registrar_relay::connection;
use registrar_relay::rooms::{RoomHistory, RoomRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "registrar=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("REGISTRAR_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("REGISTRAR_DB_PATH").unwrap_or_else(|_| "registrar.db".into());
    let upload_dir = PathBuf::from(
        std::env::var("REGISTRAR_UPLOAD_DIR").unwrap_or_else(|_| "static/profile_pics".into()),
    );
    let host = std::env::var("REGISTRAR_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("REGISTRAR_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database and the default admin account
    let db = registrar_db::Database::open(&PathBuf::from(&db_path))?;
    auth::ensure_default_admin(&db)?;

    tokio::fs::create_dir_all(&upload_dir).await?;

    // Shared state: chat room history lives for the process lifetime
    let registry = RoomRegistry::new(RoomHistory::new());
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        registry,
        upload_dir: upload_dir.clone(),
        pages: Pages::new(),
    });

    let app = Router::new()
        .route("/", get(|| async { Redirect::to("/login") }))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/admin_logout", get(auth::admin_logout))
        .route("/dashboard", get(students::dashboard))
        .route("/upload_profile_pic", post(uploads::upload_profile_pic))
        .route("/admin_dashboard", get(students::admin_dashboard))
        .route(
            "/edit_student/{id}",
            get(students::edit_student_page).post(students::update_student),
        )
        .route("/chat/{student_id}", get(chat::chat_page))
        .route("/ws", get(ws_upgrade))
        .nest_service("/static/profile_pics", ServeDir::new(upload_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Registrar portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Chat WebSocket upgrade. Requires a session of either role; the room
/// pairing itself is only checked where the chat page is rendered.
async fn ws_upgrade(
    State(state): State<AppState>,
    jar: CookieJar,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let Some(caller) = session::from_jar(&jar, &state.jwt_secret) else {
        return axum::http::StatusCode::UNAUTHORIZED.into_response();
    };

    ws.on_upgrade(move |socket| {
        connection::handle_socket(socket, state.registry.clone(), caller.username)
    })
    .into_response()
}
