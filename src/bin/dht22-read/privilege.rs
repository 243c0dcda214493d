use std::io;

/// Gives up root once GPIO memory is mapped.
///
/// Sets the effective user back to the real user. Running setuid-root this
/// leaves the process unprivileged; otherwise it is a no-op.
pub fn drop_privileges() -> io::Result<()> {
    // SAFETY: getuid has no preconditions and cannot fail.
    let uid = unsafe { libc::getuid() };
    // SAFETY: only changes this process's credentials.
    if unsafe { libc::setuid(uid) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
