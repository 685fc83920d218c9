// SPDX-License-Identifier: GPL-3.0-only

//! Native Linux camera access
//!
//! Outside a sandbox there is no permission prompt: access is whatever the
//! file mode and group membership of `/dev/video*` allow. The check is
//! repeated on every request and can never prompt.

use super::{CameraPermission, PermissionStatus, RepromptPolicy};
use crate::backends::camera::v4l2_utils::enumerate_video_nodes;
use crate::constants::devices;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Checks read/write access to V4L2 device nodes
#[derive(Debug, Clone)]
pub struct DeviceNodePermission {
    dev_dir: PathBuf,
}

impl Default for DeviceNodePermission {
    fn default() -> Self {
        Self::new(devices::DEV_DIR)
    }
}

impl DeviceNodePermission {
    /// Check nodes under `dev_dir` instead of `/dev`
    pub fn new(dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
        }
    }

    fn evaluate(&self) -> PermissionStatus {
        let nodes = enumerate_video_nodes(&self.dev_dir);
        if nodes.is_empty() {
            debug!(dir = %self.dev_dir.display(), "No video nodes found");
            return PermissionStatus::Restricted;
        }

        match nodes.iter().find(|node| is_read_writable(node)) {
            Some(node) => {
                debug!(node = %node.display(), "Video node accessible");
                PermissionStatus::Granted
            }
            None => {
                debug!(count = nodes.len(), "No accessible video node");
                PermissionStatus::Denied
            }
        }
    }
}

impl CameraPermission for DeviceNodePermission {
    async fn status(&self) -> PermissionStatus {
        self.evaluate()
    }

    async fn request(&self) -> PermissionStatus {
        self.evaluate()
    }

    fn reprompt_policy(&self) -> RepromptPolicy {
        RepromptPolicy::Disallowed
    }
}

/// `access(2)` with R_OK | W_OK for the real user
fn is_read_writable(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    let result = unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK) };
    result == 0
}
