//! Internal utilities.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Checks `path` against `mode` (`libc::R_OK`, `W_OK`, `X_OK`) with `access(2)`.
///
/// Uses the real uid, so the answer matches what the process can actually do
/// unless it is running setuid.
#[must_use]
pub fn has_access(path: &Path, mode: libc::c_int) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

/// Returns `true` if `path` exists and is both readable and writable.
#[must_use]
pub fn is_read_write(path: &Path) -> bool {
    has_access(path, libc::R_OK | libc::W_OK)
}

/// Resolves `program` the way a shell would: paths containing `/` are checked
/// directly, bare names are searched on `PATH`.
#[must_use]
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let is_exec = |p: &Path| p.is_file() && has_access(p, libc::X_OK);

    if program.contains('/') {
        let path = PathBuf::from(program);
        return is_exec(&path).then_some(path);
    }
    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| is_exec(candidate))
}

/// Sends `SIGKILL` to every process in the group led by `pgid`.
///
/// Errors (group already gone) are ignored.
pub fn kill_process_group(pgid: u32) {
    // SAFETY: `kill` has no memory-safety preconditions; a negative pid
    // addresses the process group.
    #[allow(clippy::cast_possible_wrap)]
    unsafe {
        libc::kill(-(pgid as libc::pid_t), libc::SIGKILL);
    }
}
