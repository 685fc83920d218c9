// SPDX-License-Identifier: GPL-3.0-only

//! Camera access through the XDG desktop portal
//!
//! Sandboxed applications ask `org.freedesktop.portal.Camera` for access. The
//! portal answers asynchronously: `AccessCamera` returns a request handle and
//! the decision arrives as a `Response` signal on that handle. The handle path
//! is predictable from our unique bus name and a token we choose, so we
//! subscribe before issuing the call.

use super::{CameraPermission, PermissionStatus, RepromptPolicy};
use crate::errors::PermissionError;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

#[zbus::proxy(
    interface = "org.freedesktop.portal.Camera",
    default_service = "org.freedesktop.portal.Desktop",
    default_path = "/org/freedesktop/portal/desktop"
)]
trait Camera {
    fn access_camera(&self, options: HashMap<&str, Value<'_>>) -> zbus::Result<OwnedObjectPath>;

    #[zbus(property)]
    fn is_camera_present(&self) -> zbus::Result<bool>;
}

#[zbus::proxy(
    interface = "org.freedesktop.portal.Request",
    default_service = "org.freedesktop.portal.Desktop"
)]
trait Request {
    #[zbus(signal)]
    fn response(&self, response: u32, results: HashMap<String, OwnedValue>) -> zbus::Result<()>;
}

/// Portal response code for "user granted the request"
const RESPONSE_SUCCESS: u32 = 0;

static NEXT_TOKEN: AtomicU32 = AtomicU32::new(0);

/// Camera permission via `org.freedesktop.portal.Camera`
#[derive(Debug, Clone, Default)]
pub struct PortalPermission;

impl PortalPermission {
    pub fn new() -> Self {
        Self
    }
}

impl CameraPermission for PortalPermission {
    async fn status(&self) -> PermissionStatus {
        // The portal keeps its own record of past decisions and answers
        // AccessCamera without prompting when access was already granted.
        match camera_present().await {
            Ok(true) => PermissionStatus::Unknown,
            Ok(false) => {
                info!("Portal reports no camera present");
                PermissionStatus::Restricted
            }
            Err(e) => {
                warn!(error = %e, "Failed to query camera portal");
                PermissionStatus::Unknown
            }
        }
    }

    async fn request(&self) -> PermissionStatus {
        match access_camera().await {
            Ok(true) => PermissionStatus::Granted,
            Ok(false) => PermissionStatus::Denied,
            Err(e) => {
                warn!(error = %e, "Camera access request failed");
                PermissionStatus::Denied
            }
        }
    }

    fn reprompt_policy(&self) -> RepromptPolicy {
        RepromptPolicy::Allowed
    }
}

async fn camera_present() -> Result<bool, PermissionError> {
    let connection = zbus::Connection::session()
        .await
        .map_err(|e| PermissionError::PortalUnavailable(e.to_string()))?;
    let camera = CameraProxy::new(&connection).await?;
    Ok(camera.is_camera_present().await?)
}

async fn access_camera() -> Result<bool, PermissionError> {
    let connection = zbus::Connection::session()
        .await
        .map_err(|e| PermissionError::PortalUnavailable(e.to_string()))?;

    let unique_name = connection
        .unique_name()
        .ok_or_else(|| PermissionError::RequestFailed("connection has no unique name".into()))?
        .to_string();

    let token = format!(
        "qrreader_{}_{}",
        std::process::id(),
        NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
    );
    let handle_path = request_handle_path(&unique_name, &token);
    debug!(handle = %handle_path, "Subscribing to portal response");

    let request = RequestProxy::builder(&connection)
        .path(handle_path.as_str())?
        .build()
        .await?;
    let responses = request.receive_response().await?;

    let camera = CameraProxy::new(&connection).await?;
    let mut options: HashMap<&str, Value<'_>> = HashMap::new();
    options.insert("handle_token", Value::from(token.as_str()));
    let returned = camera.access_camera(options).await?;

    let code = if returned.as_str() == handle_path {
        first_response(responses).await?
    } else {
        // Old portals pick their own handle; follow that one instead
        debug!(handle = %returned.as_str(), "Portal returned unexpected handle");
        let request = RequestProxy::builder(&connection)
            .path(returned.as_str().to_string())?
            .build()
            .await?;
        first_response(request.receive_response().await?).await?
    };

    info!(code, "Camera portal responded");
    Ok(code == RESPONSE_SUCCESS)
}

async fn first_response<S>(responses: S) -> Result<u32, PermissionError>
where
    S: futures::Stream<Item = Response>,
{
    let mut responses = std::pin::pin!(responses);
    let signal = responses
        .next()
        .await
        .ok_or_else(|| PermissionError::RequestFailed("response stream ended".into()))?;
    let args = signal.args()?;
    Ok(*args.response())
}

/// `/org/freedesktop/portal/desktop/request/SENDER/TOKEN`, where SENDER is the
/// unique name without the leading `:` and with `.` replaced by `_`.
fn request_handle_path(unique_name: &str, token: &str) -> String {
    let sender = unique_name.trim_start_matches(':').replace('.', "_");
    format!("/org/freedesktop/portal/desktop/request/{}/{}", sender, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_handle_path() {
        assert_eq!(
            request_handle_path(":1.42", "qrreader_7_0"),
            "/org/freedesktop/portal/desktop/request/1_42/qrreader_7_0"
        );
    }
}
