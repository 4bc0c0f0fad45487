//! Arguments of every `zfs` and `zpool` invocation
//!
//! Both the real executor and the dry-run log build their command lines
//! here, so what is logged is what runs.

use std::path::Path;

/// `zfs list -t snapshot`
pub fn list_snapshots() -> Vec<String> {
    vec!["list".to_string(), "-t".to_string(), "snapshot".to_string()]
}

/// `zfs snapshot [-r] dataset@tag`
pub fn create_snapshot(target: &str, recursive: bool) -> Vec<String> {
    flagged("snapshot", target, recursive)
}

/// `zfs destroy [-r] dataset@tag`
pub fn destroy_snapshot(target: &str, recursive: bool) -> Vec<String> {
    flagged("destroy", target, recursive)
}

/// `zpool scrub pool`
pub fn scrub_start(pool: &str) -> Vec<String> {
    vec!["scrub".to_string(), pool.to_string()]
}

/// `zpool status pool`
pub fn scrub_status(pool: &str) -> Vec<String> {
    vec!["status".to_string(), pool.to_string()]
}

/// Render `program args...` as one line
pub fn command_line<S: AsRef<str>>(program: &Path, args: &[S]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(<S as AsRef<str>>::as_ref(arg));
    }
    line
}

fn flagged(verb: &str, target: &str, recursive: bool) -> Vec<String> {
    let mut args = vec![verb.to_string()];
    if recursive {
        args.push("-r".to_string());
    }
    args.push(target.to_string());
    args
}
