// SPDX-License-Identifier: GPL-3.0-only

//! Camera permission gate
//!
//! Every platform answers the same question through [`CameraPermission`]:
//! may this process use the camera? The shared policy lives in the provided
//! [`CameraPermission::check_and_request_camera_permission`]:
//!
//! - already granted: yes, without prompting
//! - denied on a platform that cannot ask again: no, without prompting
//! - otherwise: prompt once and use the answer
//!
//! [`PlatformPermission`] selects the variant from configuration.

pub mod device_node;
pub mod portal;

pub use device_node::DeviceNodePermission;
pub use portal::PortalPermission;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use tracing::{debug, info};

/// Current camera access state as reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Not decided yet, or the backend cannot tell without asking
    Unknown,
    Granted,
    Denied,
    /// No camera available to grant access to
    Restricted,
}

/// Whether a backend may prompt again after a denial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepromptPolicy {
    Allowed,
    /// The user has to change the setting outside the application
    Disallowed,
}

/// Camera permission contract
pub trait CameraPermission: Send + Sync {
    /// Current status, without prompting
    fn status(&self) -> impl Future<Output = PermissionStatus> + Send;

    /// Ask the user (or the system) for access
    fn request(&self) -> impl Future<Output = PermissionStatus> + Send;

    fn reprompt_policy(&self) -> RepromptPolicy;

    /// `true` if the camera may be used. Prompts at most once.
    fn check_and_request_camera_permission(&self) -> impl Future<Output = bool> + Send {
        async move {
            let status = self.status().await;
            debug!(?status, "Camera permission status");

            match status {
                PermissionStatus::Granted => return true,
                PermissionStatus::Denied if self.reprompt_policy() == RepromptPolicy::Disallowed => {
                    debug!("Permission denied and cannot be requested again");
                    return false;
                }
                _ => {}
            }

            let outcome = self.request().await;
            info!(?outcome, "Camera permission requested");
            outcome == PermissionStatus::Granted
        }
    }
}

/// Backend that always reports the same status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPermission(pub PermissionStatus);

impl CameraPermission for FixedPermission {
    async fn status(&self) -> PermissionStatus {
        self.0
    }

    async fn request(&self) -> PermissionStatus {
        self.0
    }

    fn reprompt_policy(&self) -> RepromptPolicy {
        RepromptPolicy::Disallowed
    }
}

/// Configured permission backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionBackendKind {
    /// Portal inside a Flatpak sandbox, device nodes otherwise
    #[default]
    Auto,
    Portal,
    DeviceNode,
    /// Always granted (no camera checks)
    Granted,
    /// Always denied
    Denied,
}

impl PermissionBackendKind {
    /// Replace `Auto` with the concrete backend for this environment
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto if is_sandboxed() => Self::Portal,
            Self::Auto => Self::DeviceNode,
            other => other,
        }
    }
}

/// Running inside a Flatpak sandbox
pub fn is_sandboxed() -> bool {
    std::env::var_os("FLATPAK_ID").is_some() || Path::new("/.flatpak-info").exists()
}

/// Platform permission variants behind one type
#[derive(Debug, Clone)]
pub enum PlatformPermission {
    Portal(PortalPermission),
    DeviceNode(DeviceNodePermission),
    Fixed(FixedPermission),
}

impl PlatformPermission {
    pub fn from_kind(kind: PermissionBackendKind) -> Self {
        let resolved = kind.resolve();
        debug!(?kind, ?resolved, "Selected permission backend");

        match resolved {
            PermissionBackendKind::Portal => Self::Portal(PortalPermission::new()),
            PermissionBackendKind::Granted => {
                Self::Fixed(FixedPermission(PermissionStatus::Granted))
            }
            PermissionBackendKind::Denied => Self::Fixed(FixedPermission(PermissionStatus::Denied)),
            PermissionBackendKind::DeviceNode | PermissionBackendKind::Auto => {
                Self::DeviceNode(DeviceNodePermission::default())
            }
        }
    }
}

impl CameraPermission for PlatformPermission {
    async fn status(&self) -> PermissionStatus {
        match self {
            Self::Portal(p) => p.status().await,
            Self::DeviceNode(p) => p.status().await,
            Self::Fixed(p) => p.status().await,
        }
    }

    async fn request(&self) -> PermissionStatus {
        match self {
            Self::Portal(p) => p.request().await,
            Self::DeviceNode(p) => p.request().await,
            Self::Fixed(p) => p.request().await,
        }
    }

    fn reprompt_policy(&self) -> RepromptPolicy {
        match self {
            Self::Portal(p) => p.reprompt_policy(),
            Self::DeviceNode(p) => p.reprompt_policy(),
            Self::Fixed(p) => p.reprompt_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_permission() {
        assert!(
            FixedPermission(PermissionStatus::Granted)
                .check_and_request_camera_permission()
                .await
        );
        assert!(
            !FixedPermission(PermissionStatus::Denied)
                .check_and_request_camera_permission()
                .await
        );
    }

    #[test]
    fn test_explicit_kinds_resolve_to_themselves() {
        assert_eq!(
            PermissionBackendKind::Granted.resolve(),
            PermissionBackendKind::Granted
        );
        assert_eq!(
            PermissionBackendKind::Portal.resolve(),
            PermissionBackendKind::Portal
        );
        assert_ne!(PermissionBackendKind::Auto.resolve(), PermissionBackendKind::Auto);
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&PermissionBackendKind::DeviceNode).unwrap();
        assert_eq!(json, "\"device-node\"");
    }
}
