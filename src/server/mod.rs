//! HTTP server

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::IndexMode;
use crate::content::{ContentError, ContentLoader, PostIndex, SharedIndex};
use crate::templates::{PageData, SiteData, TemplateRenderer};
use crate::Blog;

/// Where request handlers get their index from
pub enum IndexSource {
    /// Build a private index for every request
    PerRequest,
    /// Read the shared index, which a file watcher keeps fresh
    Shared(Arc<SharedIndex>),
}

/// Server state
pub struct ServerState {
    blog: Blog,
    site: SiteData,
    renderer: TemplateRenderer,
    source: IndexSource,
}

impl ServerState {
    /// Prepare templates and, in shared mode, the initial index
    ///
    /// Templates are loaded here in both modes so a broken override fails
    /// startup instead of the first request.
    pub fn new(blog: Blog, mode: IndexMode) -> Result<Self> {
        let renderer = TemplateRenderer::with_overrides(&blog.templates_dir)?;
        let source = match mode {
            IndexMode::PerRequest => IndexSource::PerRequest,
            IndexMode::Shared => {
                let loader = ContentLoader::for_blog(&blog)?;
                IndexSource::Shared(Arc::new(SharedIndex::load(&loader)?))
            }
        };

        Ok(Self {
            site: SiteData::from(&blog.config),
            blog,
            renderer,
            source,
        })
    }

    /// The index to answer the current request from
    async fn index(&self) -> Result<Arc<PostIndex>, ServerError> {
        match &self.source {
            IndexSource::Shared(shared) => Ok(shared.snapshot()),
            IndexSource::PerRequest => {
                let blog = self.blog.clone();
                let index = tokio::task::spawn_blocking(move || blog.load_all())
                    .await
                    .map_err(|e| ServerError::Internal(e.to_string()))??;
                Ok(Arc::new(index))
            }
        }
    }

    /// Render a page; per-request mode re-reads template overrides each time
    fn render(&self, page: &PageData) -> Result<Html<String>, ServerError> {
        let template_error = |e: anyhow::Error| ServerError::Template(format!("{:#}", e));
        let html = match &self.source {
            IndexSource::PerRequest => TemplateRenderer::with_overrides(&self.blog.templates_dir)
                .and_then(|renderer| renderer.render(&self.site, page)),
            IndexSource::Shared(_) => self.renderer.render(&self.site, page),
        };
        html.map(Html).map_err(template_error)
    }
}

/// Request failures, mapped to HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Error loading posts: {0}")]
    Load(#[from] ContentError),

    #[error("Post not found")]
    NotFound,

    #[error("Error rendering template: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let static_dir = ServeDir::new(&state.blog.static_dir);

    Router::new()
        .route("/", get(blog_handler).fallback(method_not_allowed))
        .route(
            "/post/",
            get(|| async { Redirect::to("/") }).fallback(method_not_allowed),
        )
        .route("/post/:slug", get(post_handler).fallback(method_not_allowed))
        .nest_service("/static", static_dir)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: Blog, ip: &str, port: u16, mode: IndexMode) -> Result<()> {
    let state = Arc::new(ServerState::new(blog.clone(), mode)?);

    if let IndexSource::Shared(shared) = &state.source {
        let shared = Arc::clone(shared);
        let loader = ContentLoader::for_blog(&blog)?;
        let posts_dir = blog.posts_dir.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_refresh(&posts_dir, &loader, &shared) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    tracing::info!("Server started on http://{}:{}", ip, port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Rebuild the shared index whenever the posts directory changes
fn watch_and_refresh(
    posts_dir: &std::path::Path,
    loader: &ContentLoader,
    shared: &SharedIndex,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Debounce so an editor's save burst triggers a single rebuild
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    debouncer
        .watcher()
        .watch(posts_dir, RecursiveMode::NonRecursive)?;
    tracing::info!("Watching {:?} for changes", posts_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                for event in &events {
                    tracing::debug!("File changed: {}", event.path.display());
                }
                if let Ok(index) = shared.refresh(loader) {
                    tracing::info!("Reloaded index with {} posts", index.len());
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// GET / - list every post
async fn blog_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Html<String>, ServerError> {
    let index = state.index().await?;
    let posts = index.sorted(state.blog.config.listing.order);
    state.render(&PageData::listing(posts))
}

/// GET /post/{slug} - a single post
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ServerError> {
    let index = state.index().await?;
    let post = index.get(&slug).ok_or(ServerError::NotFound)?;
    state.render(&PageData::post(post))
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
