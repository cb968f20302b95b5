//! HTTP server exposing rendered pages

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::collection::FlatPages;
use crate::content::{html_escape, Page};
use crate::error::Error;
use crate::Site;

/// Server state
#[derive(Clone)]
struct ServerState {
    pages: Arc<FlatPages>,
    debug: bool,
}

/// Start the server and block until it stops
pub async fn start(site: &Site, ip: &str, port: u16, debug: bool) -> Result<()> {
    let app = router(site.pages.clone(), debug);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Serving {} at http://{}:{}", site.pages.root().display(), ip, port);
    if site.pages.options().auto_reload.should_reload(debug) {
        println!("Pages are reloaded on every request.");
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes: `/` lists every page, `/<path>` serves one page as HTML
pub fn router(pages: Arc<FlatPages>, debug: bool) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/*path", get(page_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ServerState { pages, debug })
}

async fn index_handler(State(state): State<ServerState>) -> Response {
    respond(state, |pages| Ok(render_index(&pages.all()?))).await
}

async fn page_handler(State(state): State<ServerState>, Path(path): Path<String>) -> Response {
    respond(state, move |pages| {
        Ok(pages.get_or_not_found(&path)?.html().to_string())
    })
    .await
}

/// Run `work` against the collection off the async runtime
///
/// Building the collection reads and parses files, so it never runs on a
/// runtime worker thread.
async fn respond<F>(state: ServerState, work: F) -> Response
where
    F: FnOnce(&FlatPages) -> crate::Result<String> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        state.pages.auto_reset(state.debug);
        work(&state.pages)
    })
    .await;

    match result {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(err)) => error_response(err),
        Err(err) => {
            tracing::error!("Request task failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

fn error_response(err: Error) -> Response {
    if err.is_not_found() {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    tracing::error!("Failed to load pages: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

fn render_index(pages: &[Arc<Page>]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Pages</title></head>\n<body>\n<ul>\n",
    );
    for page in pages {
        let title = match page.get("title") {
            Some(title) => title.to_string(),
            None => page.path().to_string(),
        };
        html.push_str(&format!(
            "<li><a href=\"/{}\">{}</a></li>\n",
            html_escape(page.path()),
            html_escape(&title)
        ));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}
