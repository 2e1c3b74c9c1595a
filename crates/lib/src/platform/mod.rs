pub mod os;
pub mod paths;

pub use os::Os;

/// Returns a short description of the host (e.g., "x86_64-linux")
///
/// Returns `None` if the current OS is not supported
pub fn host_description() -> Option<String> {
  Os::current().map(|os| format!("{}-{}", std::env::consts::ARCH, os))
}
