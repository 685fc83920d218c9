// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 device discovery
//!
//! Used by `list` and by the device-node permission check. Only needs libc,
//! so it is available without the `v4l2` capture feature.

use super::types::DeviceInfo;
use crate::constants::devices;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use tracing::debug;

/// VIDIOC_QUERYCAP ioctl number
const VIDIOC_QUERYCAP: libc::c_ulong = 0x80685600;

/// V4L2 capability structure for VIDIOC_QUERYCAP ioctl
#[repr(C)]
struct V4l2Capability {
    driver: [u8; 16],
    card: [u8; 32],
    bus_info: [u8; 32],
    version: u32,
    capabilities: u32,
    device_caps: u32,
    reserved: [u32; 3],
}

fn query_v4l2_cap(fd: RawFd) -> Option<V4l2Capability> {
    let mut cap: V4l2Capability = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, VIDIOC_QUERYCAP as _, &mut cap as *mut V4l2Capability) };
    if result < 0 { None } else { Some(cap) }
}

fn c_string_field(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&c| c == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).to_string()
}

/// `videoN` entries of `dir`, sorted by N
pub fn enumerate_video_nodes(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut nodes: Vec<(u32, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let index = name
                .to_str()?
                .strip_prefix(devices::VIDEO_NODE_PREFIX)?
                .parse::<u32>()
                .ok()?;
            Some((index, entry.path()))
        })
        .collect();

    nodes.sort_by_key(|(index, _)| *index);
    nodes.into_iter().map(|(_, path)| path).collect()
}

/// Open `path` and ask the driver for its name and card.
/// Returns None if the device cannot be opened or is not a V4L2 node.
pub fn query_device(path: &Path) -> Option<DeviceInfo> {
    let file = std::fs::File::open(path).ok()?;
    let cap = query_v4l2_cap(file.as_raw_fd())?;

    let info = DeviceInfo {
        path: path.display().to_string(),
        card: c_string_field(&cap.card),
        driver: c_string_field(&cap.driver),
    };

    debug!(path = %info.path, driver = %info.driver, card = %info.card, "Queried V4L2 device");
    Some(info)
}

/// Every queryable video node under `dir`
pub fn list_devices(dir: &Path) -> Vec<DeviceInfo> {
    enumerate_video_nodes(dir)
        .iter()
        .filter_map(|node| query_device(node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_sorts_numerically_and_filters() {
        let dir = std::env::temp_dir().join(format!("qrreader-nodes-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["video10", "video2", "video0", "videox", "v4l-subdev0", "null"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        let nodes: Vec<String> = enumerate_video_nodes(&dir)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(nodes, ["video0", "video2", "video10"]);

        // Regular files are not V4L2 devices
        assert!(list_devices(&dir).is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_c_string_field() {
        assert_eq!(c_string_field(b"uvcvideo\0\0\0"), "uvcvideo");
        assert_eq!(c_string_field(b"full"), "full");
    }

    #[test]
    fn test_missing_dir() {
        assert!(enumerate_video_nodes(Path::new("/nonexistent/dev")).is_empty());
    }
}
