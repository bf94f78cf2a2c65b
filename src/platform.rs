/// Operating system name and kernel release, for the figure title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub system: String,
    pub release: String,
}

#[cfg(unix)]
pub fn platform_info() -> PlatformInfo {
    use std::ffi::CStr;

    // SAFETY: utsname is plain old data and uname only writes into it
    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut uts) } != 0 {
        return fallback();
    }
    // SAFETY: on success both fields hold NUL-terminated strings
    let (system, release) = unsafe {
        (
            CStr::from_ptr(uts.sysname.as_ptr()),
            CStr::from_ptr(uts.release.as_ptr()),
        )
    };
    PlatformInfo {
        system: system.to_string_lossy().into_owned(),
        release: release.to_string_lossy().into_owned(),
    }
}

#[cfg(not(unix))]
pub fn platform_info() -> PlatformInfo {
    fallback()
}

fn fallback() -> PlatformInfo {
    PlatformInfo {
        system: std::env::consts::OS.to_string(),
        release: "unknown".to_string(),
    }
}
