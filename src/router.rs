use async_trait::async_trait;

use crate::envelope::ResponseEnvelope;
use crate::errors::ControllerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    On,
    Off,
    Status,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Route> {
        match path {
            "/on" => Some(Route::On),
            "/off" => Some(Route::Off),
            "/status" => Some(Route::Status),
            _ => None,
        }
    }
}

/// A resource that can be switched from a function URL.
#[async_trait]
pub trait PowerController: Send + Sync {
    /// Handles a recognised route. Routes the controller does not serve
    /// must answer with [`ResponseEnvelope::not_found`].
    async fn handle(&self, route: Route) -> Result<ResponseEnvelope, ControllerError>;
}

pub async fn dispatch(controller: &dyn PowerController, path: &str) -> Result<ResponseEnvelope, ControllerError> {
    match Route::from_path(path) {
        Some(route) => controller.handle(route).await,
        None => ResponseEnvelope::not_found(),
    }
}
