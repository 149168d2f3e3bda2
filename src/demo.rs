//! Demo application served by the `stratum` binary.
//!
//! ```text
//! GET  /admin/version           → "0.1.5"
//! GET  /admin/users?start_id=N  → page of users (JSON)
//! GET  /admin/users/:id         → one user, or 404 "out of range"
//! POST /admin/users             → append a JSON user, "OK"
//! GET  <static mount>/...       → files from the configured directory
//! ```
//!
//! The users routes live in their own [`App`] mounted at `/admin`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::http::middleware::{BearerAuth, BodyParser, Logger, StaticFiles};
use crate::http::{Context, Error, Payload, Result, SetupError};
use crate::pipeline::{handler_fn, mount, App, Handler};
use crate::routing::Router;

pub const VERSION: &str = "0.1.5";
const PAGE_SIZE: usize = 6;

/// In-memory user list shared by the users routes.
#[derive(Clone)]
pub struct UserStore {
    users: Arc<RwLock<Vec<Value>>>,
}

impl UserStore {
    /// Store seeded with `testuser0`..`testuser2`.
    pub fn seeded() -> Self {
        let users = (0..3).map(|id| json!({ "name": format!("testuser{id}") })).collect();
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    pub async fn page(&self, start: usize, size: usize) -> Vec<Value> {
        let users = self.users.read().await;
        users.iter().skip(start).take(size).cloned().collect()
    }

    pub async fn get(&self, id: i64) -> Option<Value> {
        let users = self.users.read().await;
        usize::try_from(id).ok().and_then(|id| users.get(id).cloned())
    }

    pub async fn push(&self, user: Value) {
        self.users.write().await.push(user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

struct ListUsers(UserStore);

#[async_trait]
impl Handler for ListUsers {
    async fn handle(&self, ctx: &mut Context) -> Result<()> {
        let start = match ctx.request.query_value("start_id") {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                Error::abort(StatusCode::BAD_REQUEST, format!("invalid start_id {raw:?}"))
            })?,
            None => 0,
        };
        let page = self.0.page(start, PAGE_SIZE).await;
        ctx.response.set_body(Value::Array(page));
        Ok(())
    }
}

struct GetUser(UserStore);

#[async_trait]
impl Handler for GetUser {
    async fn handle(&self, ctx: &mut Context) -> Result<()> {
        let raw = ctx.request.param("id").unwrap_or_default();
        let id = raw.parse::<i64>().map_err(|_| {
            Error::abort(StatusCode::BAD_REQUEST, format!("invalid user id {raw:?}"))
        })?;
        match self.0.get(id).await {
            Some(user) => ctx.response.set_body(user),
            None => {
                ctx.response.set_status(StatusCode::NOT_FOUND);
                ctx.response.set_body("out of range");
            }
        }
        Ok(())
    }
}

struct CreateUser(UserStore);

#[async_trait]
impl Handler for CreateUser {
    async fn handle(&self, ctx: &mut Context) -> Result<()> {
        let user = match &ctx.request.body {
            Some(Payload::Json(user @ Value::Object(_))) => user.clone(),
            _ => {
                return Err(Error::abort(
                    StatusCode::BAD_REQUEST,
                    "expected a JSON object",
                ))
            }
        };
        tracing::info!(user = %user, "Posted user");
        self.0.push(user).await;
        ctx.response.set_body("OK");
        Ok(())
    }
}

/// The users sub-application, unprefixed.
pub fn users_app(store: &UserStore) -> Result<App, SetupError> {
    let mut router = Router::new();
    router
        .get("/users", ListUsers(store.clone()))?
        .get("/users/:id", GetUser(store.clone()))?
        .post("/users", CreateUser(store.clone()))?;

    let mut app = App::new();
    app.with(router.middleware());
    Ok(app)
}

/// The full demo application.
pub fn create_app(config: &ServerConfig, store: &UserStore) -> Result<App, SetupError> {
    let mut app = App::new();
    app.expose_errors(config.errors.expose_details)
        .with(Logger)
        .with(BodyParser);

    if let Some(token) = &config.security.admin_token {
        app.with(mount("/admin", BearerAuth::new(token.clone()))?);
    }

    let mut router = Router::new();
    router.get(
        "/admin/version",
        handler_fn(|ctx| {
            ctx.response.set_body(VERSION);
            Ok(())
        }),
    )?;
    app.with(router.middleware());

    if let Some(static_files) = &config.static_files {
        app.with(mount(
            &static_files.mount_path,
            StaticFiles::new(&static_files.root)?,
        )?);
    }

    app.with(mount("/admin", users_app(store)?.middleware())?);
    Ok(app)
}
