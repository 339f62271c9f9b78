use crate::{auth::AuthService, auth::SessionStore, db::Datastore, utils::Config};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub sessions: Arc<dyn SessionStore>,
    pub auth: Arc<AuthService>,
    pub config: Arc<Config>,
}
