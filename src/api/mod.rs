//! All API endpoint setup

use axum::Router;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;

pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use response::Error;
pub use response::Success;

use crate::repository::NoteRepository;
use crate::session::JwtKeys;
use crate::session::SessionProvider;
use crate::storage::Storage;

mod dump_notes;
mod folders;
mod notes;
mod request;
mod response;
mod session;
mod tags;
mod users;
mod views;

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState<S: Storage> {
    /// Notes, folders and tags
    pub repository: NoteRepository<S>,

    /// Sign up, sign in and token resolution
    pub sessions: SessionProvider<S>,
}

impl<S: Storage> AppState<S> {
    /// Create the state on top of a storage
    pub fn new(storage: S, jwt_keys: JwtKeys) -> Self {
        Self {
            repository: NoteRepository::new(storage.clone()),
            sessions: SessionProvider::new(storage, jwt_keys),
        }
    }
}

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router<AppState<S>> {
    let users = Router::new()
        .route("/", post(users::sign_up::<S>))
        .route("/token", post(users::token::<S>));

    let session = Router::new()
        .route("/", get(users::current))
        .route("/sign-out", post(users::sign_out::<S>));

    let views = Router::new()
        .route("/all", get(views::all::<S>))
        .route("/favorites", get(views::favorites::<S>))
        .route("/folders/{folder}", get(views::folder::<S>))
        .route("/tags/{tag}", get(views::tag::<S>))
        .route("/search", get(views::search::<S>));

    let notes = Router::new()
        .route("/", post(notes::create::<S>))
        .route("/{note}", get(notes::single::<S>))
        .route("/{note}", put(notes::update::<S>))
        .route("/{note}", delete(notes::delete::<S>))
        .route("/{note}/favorite", put(notes::favorite::<S>));

    let dump_notes = Router::new()
        .route("/", post(dump_notes::create::<S>))
        .route("/{note}", put(dump_notes::update::<S>));

    let folders = Router::new()
        .route("/", get(folders::list::<S>))
        .route("/", post(folders::create::<S>))
        .route("/{folder}", delete(folders::delete::<S>));

    let tags = Router::new()
        .route("/", get(tags::list::<S>))
        .route("/", post(tags::create::<S>))
        .route("/{tag}", delete(tags::delete::<S>));

    Router::new()
        .nest("/users", users)
        .nest("/session", session)
        .nest("/views", views)
        .nest("/notes", notes)
        .nest("/dump-notes", dump_notes)
        .nest("/folders", folders)
        .nest("/tags", tags)
}
