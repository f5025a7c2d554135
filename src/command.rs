//! Administrative command surface: `distb reload`.

use crate::config::{ConfigSource, ConfigStore};
use crate::constants::{COMMAND_LABEL, MESSAGE_PREFIX, RELOAD_SUBCOMMAND};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command was recognised; the message goes back to whoever sent it.
    Handled(String),
    /// Not ours, or malformed. The host decides how to report usage.
    NotHandled,
}

/// Handle `label args...` from an administrator.
pub fn handle_command<S: ConfigSource + ?Sized>(
    store: &ConfigStore,
    source: &S,
    label: &str,
    args: &[&str],
) -> CommandOutcome {
    if !label.eq_ignore_ascii_case(COMMAND_LABEL) {
        return CommandOutcome::NotHandled;
    }
    match args {
        [sub] if sub.eq_ignore_ascii_case(RELOAD_SUBCOMMAND) => {
            CommandOutcome::Handled(match store.reload(source) {
                Ok(_) => format!("{MESSAGE_PREFIX} Configuration reloaded."),
                Err(e) => format!("{MESSAGE_PREFIX} Reload failed: {e}"),
            })
        }
        _ => CommandOutcome::NotHandled,
    }
}

/// Split a console line into label and arguments, then handle it.
pub fn handle_line<S: ConfigSource + ?Sized>(
    store: &ConfigStore,
    source: &S,
    line: &str,
) -> CommandOutcome {
    let line = line.trim().trim_start_matches('/');
    let mut words = line.split_whitespace();
    let Some(label) = words.next() else {
        return CommandOutcome::NotHandled;
    };
    let args: Vec<&str> = words.collect();
    handle_command(store, source, label, &args)
}
