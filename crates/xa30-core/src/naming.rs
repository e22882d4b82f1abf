//! Multi-echo file naming.
//!
//! The converter names the first echo `..._e1` (or `..._echo1`) only when it
//! knows the series has several echoes, which XA30 exports hide from it.
//! Every rule here acts on the file name alone; parent directories are never
//! rewritten.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Marker the converter uses for the first echo.
pub const FIRST_ECHO_MARKER: &str = "e1";

/// Alternative first-echo marker.
pub const FIRST_ECHO_SYNONYM: &str = "echo1";

/// Marker of phase images.
pub const PHASE_MARKER: &str = "_ph";

/// Prefix of the echo numeral in a file name (`e` or `echo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoPrefix {
    /// `..._e1`, `..._e2`, ...
    #[default]
    E,
    /// `..._echo1`, `..._echo2`, ...
    Echo,
}

impl EchoPrefix {
    /// The prefix text.
    pub fn as_str(self) -> &'static str {
        match self {
            EchoPrefix::E => "e",
            EchoPrefix::Echo => "echo",
        }
    }
}

/// What the first echo's base path needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstEcho {
    /// The name already carries `e1`.
    Marked,
    /// The name carries `echo1`; later echoes count with the `echo` prefix.
    Synonym,
    /// The files must move to this base path.
    Rename(PathBuf),
}

/// Appends `suffix` to a path without touching any existing extension.
pub fn append_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

fn file_name(base: &Path) -> String {
    base.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether the base path names a phase image.
pub fn is_phase(base: &Path) -> bool {
    file_name(base).contains(PHASE_MARKER)
}

/// Decides how the first echo's base path must change.
pub fn first_echo(base: &Path) -> FirstEcho {
    let name = file_name(base);
    if name.contains(FIRST_ECHO_MARKER) {
        return FirstEcho::Marked;
    }
    if name.contains(FIRST_ECHO_SYNONYM) {
        return FirstEcho::Synonym;
    }

    let marked = if name.contains(PHASE_MARKER) {
        name.replace(PHASE_MARKER, &format!("_{FIRST_ECHO_MARKER}{PHASE_MARKER}"))
    } else {
        format!("{name}_{FIRST_ECHO_MARKER}")
    };
    FirstEcho::Rename(base.with_file_name(marked))
}

/// Base path of echo `index` (zero-based), derived from the first echo's.
pub fn echo_base(first: &Path, prefix: EchoPrefix, index: usize) -> PathBuf {
    let prefix = prefix.as_str();
    let name = file_name(first).replace(&format!("{prefix}1"), &format!("{prefix}{}", index + 1));
    first.with_file_name(name)
}
