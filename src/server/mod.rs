//! Notice server: JSON API, rendered page and static assets
//!
//! Every request reads the notices directory afresh, so edits show up
//! without a restart.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, FixedOffset};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::content::NoticeLoader;
use crate::error::NoticeError;
use crate::templates::{PageRenderer, Target};
use crate::Noticeboard;

/// Server state
struct ServerState {
    board: Noticeboard,
    loader: NoticeLoader,
    renderer: PageRenderer,
    /// Default date for undated notices, fixed for the life of the process so
    /// responses only change when the notices do
    now: DateTime<FixedOffset>,
}

fn state(board: &Noticeboard) -> Result<Arc<ServerState>> {
    Ok(Arc::new(ServerState {
        board: board.clone(),
        loader: NoticeLoader::new(board),
        renderer: PageRenderer::new(board)?,
        now: board.now(),
    }))
}

/// Build the application router
pub fn router(board: &Noticeboard) -> Result<Router> {
    // Any origin may call the API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let app = Router::new()
        .route("/", get(page_handler))
        .route("/api/notices", get(list_handler))
        .route("/api/notices/:filename", get(notice_handler))
        .fallback_service(ServeDir::new(&board.public_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state(board)?);

    Ok(app)
}

/// Start the server
pub async fn start(board: &Noticeboard, ip: &str, port: u16, open: bool) -> Result<()> {
    let app = router(board)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Notice server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /api/notices
async fn list_handler(State(state): State<Arc<ServerState>>) -> Response {
    let locale = state.board.config.language;

    match state.loader.load_all(state.now).await {
        Ok(notices) => Json(notices).into_response(),
        Err(e) => {
            tracing::error!("Failed to load notices: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, locale.list_failed())
        }
    }
}

/// GET /api/notices/:filename
async fn notice_handler(
    State(state): State<Arc<ServerState>>,
    Path(filename): Path<String>,
) -> Response {
    let locale = state.board.config.language;

    match state.loader.load_one(&filename, state.now).await {
        Ok(notice) => Json(notice).into_response(),
        Err(NoticeError::NotFound(_)) => error_response(StatusCode::NOT_FOUND, locale.not_found()),
        Err(e) => {
            tracing::error!("Failed to load notice {}: {}", filename, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, locale.list_failed())
        }
    }
}

/// GET /
async fn page_handler(State(state): State<Arc<ServerState>>) -> Response {
    let locale = state.board.config.language;

    let page = match state.loader.load_all(state.now).await {
        Ok(notices) => state.renderer.render_page(&notices, Target::Server),
        Err(e) => Err(e.into()),
    };

    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, locale.page_failed()).into_response()
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<ServerState>) {
        let dir = TempDir::new().unwrap();
        let notices = dir.path().join("notices");
        fs::create_dir_all(&notices).unwrap();
        fs::write(notices.join("a.md"), "---\ndate: 2024-01-01\n---\nOld\n").unwrap();
        fs::write(
            notices.join("b.md"),
            "---\ntitle: Maintenance\ndate: 2024-06-01\n---\nNew\n",
        )
        .unwrap();
        let board = Noticeboard::new(dir.path()).unwrap();
        let state = state(&board).unwrap();
        (dir, state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_notices() {
        let (_dir, state) = setup();
        let response = list_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json[0]["filename"], "b.md");
        assert_eq!(json[1]["filename"], "a.md");
        assert_eq!(json[1]["title"], "제목 없음");
        assert_eq!(json[0]["rawContent"], "New\n");
    }

    #[tokio::test]
    async fn test_list_notices_failure_is_500() {
        let (dir, state) = setup();
        fs::write(dir.path().join("notices/bad.md"), "---\ntitle: open\n").unwrap();

        let response = list_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "공지사항을 불러오는데 실패했습니다.");
    }

    #[tokio::test]
    async fn test_get_notice() {
        let (_dir, state) = setup();
        let response = notice_handler(State(state.clone()), Path("b.md".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["title"], "Maintenance");

        let response = notice_handler(State(state), Path("missing.md".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "공지사항을 찾을 수 없습니다.");
    }

    #[tokio::test]
    async fn test_list_stable_for_undated_notices() {
        let (dir, state) = setup();
        fs::write(dir.path().join("notices/undated.md"), "No date here\n").unwrap();

        let first = body_json(list_handler(State(state.clone())).await).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = body_json(list_handler(State(state)).await).await;
        assert_eq!(first, second);
        assert_eq!(first[0]["filename"], "undated.md");
    }

    #[tokio::test]
    async fn test_listed_filenames_are_fetchable() {
        let (dir, state) = setup();
        fs::write(
            dir.path().join("notices/.draft.md"),
            "---\ntitle: Draft\ndate: 2024-03-01\n---\n",
        )
        .unwrap();

        let json = body_json(list_handler(State(state.clone())).await).await;
        let names: Vec<String> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["filename"].as_str().unwrap().to_string())
            .collect();
        assert!(names.contains(&".draft.md".to_string()));

        for name in names {
            let response = notice_handler(State(state.clone()), Path(name.clone())).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_page() {
        let (_dir, state) = setup();
        let response = page_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Maintenance"));
        assert!(html.contains("/api/notices"));
    }

    #[test]
    fn test_router_builds() {
        let (dir, _state) = setup();
        let board = Noticeboard::new(dir.path()).unwrap();
        assert!(router(&board).is_ok());
    }
}
