//! Destination path derivation and filesystem helpers

use crate::types::{DownloadFormat, ItemKind};
use std::path::{Path, PathBuf};

/// Characters never allowed in a path component, across platforms
const ILLEGAL_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Derive the destination path for one item
///
/// This is the single place the path invariant lives: the result is a pure
/// function of its arguments, so two descriptors with the same
/// (artist, title, format, kind) always map to the same path and re-runs are
/// idempotent. The format tag in the file name keeps a second format of the
/// same title from overwriting the first.
///
/// Layout: `<root>/<artist>/<title> [<format>].<ext>`, where albums use the
/// `zip` extension and single tracks the format's audio extension.
pub fn destination_for(
    root: &Path,
    artist: &str,
    title: &str,
    format: DownloadFormat,
    kind: ItemKind,
) -> PathBuf {
    let extension = match kind {
        ItemKind::Album => "zip",
        ItemKind::Track => format.audio_extension(),
    };
    let file_name = format!(
        "{} [{}].{}",
        sanitize_component(title),
        format.as_str(),
        extension
    );
    root.join(sanitize_component(artist)).join(file_name)
}

/// Make a string safe to use as one path component
///
/// Separators, reserved punctuation and control characters become
/// underscores; leading/trailing dots and whitespace are trimmed so the name
/// cannot escape its directory or end in a Windows-invalid character. An
/// empty result falls back to "unknown".
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_control() || ILLEGAL_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Get available disk space for a given path
///
/// Uses platform-specific APIs to query filesystem statistics:
/// - Unix: statvfs
/// - Windows: GetDiskFreeSpaceExW
pub fn available_space(path: &Path) -> std::io::Result<u64> {
    #[cfg(unix)]
    {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        // SAFETY: c_path is a valid null-terminated C string, stat is zeroed
        // before the call, and the struct is only read after statvfs reports
        // success.
        unsafe {
            let mut stat: libc::statvfs = std::mem::zeroed();
            if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
                return Err(std::io::Error::last_os_error());
            }

            // f_bavail is the block count available to unprivileged users;
            // f_frsize is the fragment size.
            Ok(stat.f_bavail.saturating_mul(stat.f_frsize))
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        use winapi::um::fileapi::GetDiskFreeSpaceExW;

        let wide_path: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // SAFETY: wide_path is a valid null-terminated wide string, the output
        // pointers target properly aligned u64 variables, and they are only
        // read after the call reports success.
        unsafe {
            let mut free_bytes_available: u64 = 0;
            let mut _total_bytes: u64 = 0;
            let mut _total_free_bytes: u64 = 0;

            if GetDiskFreeSpaceExW(
                wide_path.as_ptr(),
                &mut free_bytes_available as *mut u64 as *mut _,
                &mut _total_bytes as *mut u64 as *mut _,
                &mut _total_free_bytes as *mut u64 as *mut _,
            ) == 0
            {
                return Err(std::io::Error::last_os_error());
            }

            Ok(free_bytes_available)
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "Disk space checking is not supported on this platform",
        ))
    }
}
