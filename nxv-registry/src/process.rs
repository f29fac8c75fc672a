//! PID liveness and termination.
//!
//! The registry is spawned as the leader of its own process group, so
//! termination signals the whole group (the package runner and the server it
//! launched). The group is only addressed when the recorded PID really leads
//! it, or when the leader is gone but members of its group are still running.

use std::io;
use std::thread::sleep;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// How long to wait for the process to vanish after `SIGKILL`.
const KILL_WAIT: Duration = Duration::from_secs(2);

/// Result of a successful [`terminate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Neither the process nor any member of its group was running.
    AlreadyGone,
    /// Exited after `SIGTERM`.
    Terminated,
    /// Needed `SIGKILL` after the grace period.
    Killed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Term,
    Kill,
}

/// Sends `signal` to a raw `kill(2)` target (negative for a process group).
pub(crate) type KillFn = fn(i32, Signal) -> io::Result<()>;

/// Whether `pid` names a live, non-zombie process.
pub fn is_alive(pid: u32) -> bool {
    let Some(raw) = to_raw_pid(pid) else {
        return false;
    };
    #[cfg(unix)]
    {
        // SAFETY: signal 0 performs the existence and permission checks only.
        #[allow(unsafe_code)]
        let result = unsafe { libc::kill(raw, 0) };
        if result != 0 {
            // EPERM: exists, owned by someone else.
            return io::Error::last_os_error().raw_os_error() == Some(libc::EPERM);
        }
        !is_zombie(pid)
    }
    #[cfg(not(unix))]
    {
        let _ = raw;
        false
    }
}

/// Ask `pid` (and its process group, when it leads one) to exit, escalating
/// to `SIGKILL` after `grace`.
///
/// Returns an error only when something is still running and could not be
/// stopped, or when `pid` is not a PID this module will ever signal.
pub fn terminate(pid: u32, grace: Duration) -> io::Result<Termination> {
    terminate_with(pid, grace, sys_kill)
}

pub(crate) fn terminate_with(pid: u32, grace: Duration, kill: KillFn) -> io::Result<Termination> {
    let Some(raw) = to_raw_pid(pid) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to signal pid {pid}"),
        ));
    };

    let group = leads_group(raw);
    if !target_alive(raw, group) {
        return Ok(Termination::AlreadyGone);
    }

    if !send(raw, group, Signal::Term, kill)? {
        return Ok(Termination::AlreadyGone);
    }
    if wait_for_exit(raw, group, grace) {
        return Ok(Termination::Terminated);
    }

    tracing::warn!(
        pid,
        group,
        grace_ms = grace.as_millis() as u64,
        "process ignored SIGTERM, sending SIGKILL"
    );
    if !send(raw, group, Signal::Kill, kill)? {
        return Ok(Termination::Killed);
    }
    if wait_for_exit(raw, group, KILL_WAIT) {
        return Ok(Termination::Killed);
    }
    Err(io::Error::other(format!("process {pid} still alive after SIGKILL")))
}

/// `Ok(false)` when neither the group nor the PID exists.
fn send(raw: i32, group: bool, signal: Signal, kill: KillFn) -> io::Result<bool> {
    let targets: &[i32] = if group { &[-raw, raw] } else { &[raw] };
    for &target in targets {
        match kill(target, signal) {
            Ok(()) => return Ok(true),
            Err(err) if is_esrch(&err) => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(false)
}

fn wait_for_exit(raw: i32, group: bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if !target_alive(raw, group) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(POLL_INTERVAL);
    }
}

fn target_alive(raw: i32, group: bool) -> bool {
    is_alive(raw as u32) || (group && group_alive(raw))
}

/// True when `raw` is its own process group id. A leader that already exited
/// still counts while other members of its group run.
fn leads_group(raw: i32) -> bool {
    #[cfg(unix)]
    {
        // SAFETY: getpgid only reads process table state for a positive PID.
        #[allow(unsafe_code)]
        let pgid = unsafe { libc::getpgid(raw) };
        if pgid >= 0 {
            return pgid == raw;
        }
        group_alive(raw)
    }
    #[cfg(not(unix))]
    {
        let _ = raw;
        false
    }
}

/// Rejects 0, 1 and values that do not fit `pid_t`, and never signals
/// ourselves. `-0` and `-1` as `kill(2)` targets mean "our group" and
/// "everyone".
fn to_raw_pid(pid: u32) -> Option<i32> {
    if pid <= 1 || pid == std::process::id() {
        return None;
    }
    i32::try_from(pid).ok()
}

fn is_esrch(err: &io::Error) -> bool {
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(libc::ESRCH)
    }
    #[cfg(not(unix))]
    {
        let _ = err;
        false
    }
}

pub(crate) fn sys_kill(target: i32, signal: Signal) -> io::Result<()> {
    #[cfg(unix)]
    {
        let signo = match signal {
            Signal::Term => libc::SIGTERM,
            Signal::Kill => libc::SIGKILL,
        };
        // SAFETY: callers pass a validated PID (> 1) or its negation.
        #[allow(unsafe_code)]
        let result = unsafe { libc::kill(target, signo) };
        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (target, signal);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "process termination is only supported on unix",
        ))
    }
}

// ---------------------------------------------------------------------------
// /proc inspection
// ---------------------------------------------------------------------------

/// State letter and process group of `pid`, from `/proc/<pid>/stat`.
#[cfg(target_os = "linux")]
fn proc_stat(pid: u32) -> Option<(String, i32)> {
    let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    // `pid (comm) S ppid pgrp ...`; comm may itself contain parentheses.
    let end = stat.rfind(')')?;
    let mut fields = stat[end + 1..].split_whitespace();
    let state = fields.next()?.to_string();
    let pgrp = fields.nth(1)?.parse().ok()?;
    Some((state, pgrp))
}

/// A zombie still answers `kill(pid, 0)`; treat it as dead.
#[cfg(target_os = "linux")]
fn is_zombie(pid: u32) -> bool {
    proc_stat(pid).is_some_and(|(state, _)| state == "Z")
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_zombie(_pid: u32) -> bool {
    false
}

/// Any non-zombie process in group `pgid`.
#[cfg(target_os = "linux")]
fn group_alive(pgid: i32) -> bool {
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return false;
    };
    entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
        .any(|pid| proc_stat(pid).is_some_and(|(state, pgrp)| pgrp == pgid && state != "Z"))
}

#[cfg(all(unix, not(target_os = "linux")))]
fn group_alive(pgid: i32) -> bool {
    // SAFETY: signal 0 to a positive group id only checks existence.
    #[allow(unsafe_code)]
    let result = unsafe { libc::kill(-pgid, 0) };
    result == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn group_alive(_pgid: i32) -> bool {
    false
}
