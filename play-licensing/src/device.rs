//! Caller identity for backend sessions.
//!
//! The licensing backend mixes the package name and a stable device
//! identifier into its response obfuscation. On a phone both come from
//! the platform; [`HostIdentity`] derives a comparable identifier from
//! hardware identifiers for desktop hosts and tests.

use sha2::{Digest, Sha256};
use std::env;

/// Supplies the identity material a backend session is built with.
pub trait PlatformIdentity: Send + Sync {
    /// Package name of the calling application.
    fn package_name(&self) -> String;

    /// Stable per-device identifier.
    fn device_id(&self) -> String;
}

/// Fixed identity values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    pub package_name: String,
    pub device_id: String,
}

impl StaticIdentity {
    pub fn new(package_name: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            device_id: device_id.into(),
        }
    }
}

impl PlatformIdentity for StaticIdentity {
    fn package_name(&self) -> String {
        self.package_name.clone()
    }

    fn device_id(&self) -> String {
        self.device_id.clone()
    }
}

/// Identity of the current host machine.
///
/// The device id is 16 lowercase hex digits: the first 8 bytes of a
/// SHA-256 over OS, architecture, hostname, machine id and user name.
/// It survives reboots but changes when the machine does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    package_name: String,
    device_id: String,
}

impl HostIdentity {
    /// Computes the identity of this machine for the given package.
    #[must_use]
    pub fn collect(package_name: impl Into<String>) -> Self {
        let combined = collect_hardware_ids().join("|");

        let mut hasher = Sha256::new();
        hasher.update(combined.as_bytes());
        let hash = hasher.finalize();

        Self {
            package_name: package_name.into(),
            device_id: hex::encode(&hash[..8]),
        }
    }
}

impl PlatformIdentity for HostIdentity {
    fn package_name(&self) -> String {
        self.package_name.clone()
    }

    fn device_id(&self) -> String {
        self.device_id.clone()
    }
}

fn collect_hardware_ids() -> Vec<String> {
    let mut ids = vec![env::consts::OS.to_string(), env::consts::ARCH.to_string()];

    ids.push(
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string()),
    );

    if let Some(machine_id) = machine_id() {
        ids.push(machine_id);
    }

    if let Ok(user) = env::var("USER").or_else(|_| env::var("USERNAME")) {
        ids.push(user);
    }

    ids
}

/// Files holding the systemd or D-Bus machine id, in lookup order.
#[cfg(target_os = "linux")]
const MACHINE_ID_FILES: [&str; 2] = ["/etc/machine-id", "/var/lib/dbus/machine-id"];

#[cfg(target_os = "linux")]
fn machine_id() -> Option<String> {
    MACHINE_ID_FILES.iter().find_map(|path| {
        let contents = std::fs::read_to_string(path).ok()?;
        let id = contents.trim();
        (!id.is_empty()).then(|| id.to_string())
    })
}

#[cfg(target_os = "macos")]
fn machine_id() -> Option<String> {
    let output = std::process::Command::new("ioreg")
        .args(["-rd1", "-c", "IOPlatformExpertDevice"])
        .output()
        .ok()?;
    String::from_utf8(output.stdout)
        .ok()?
        .lines()
        .find_map(platform_uuid)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn machine_id() -> Option<String> {
    None
}

/// Value of an `"IOPlatformUUID" = "<uuid>"` registry line.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn platform_uuid(line: &str) -> Option<String> {
    let (_, rest) = line.split_once("\"IOPlatformUUID\"")?;
    let value = rest.trim_start().strip_prefix('=')?.trim().trim_matches('"');
    (!value.is_empty()).then(|| value.to_string())
}
