// Administrative `distb reload` command.

use distance_beam::{handle_command, handle_line, CommandOutcome, ConfigStore, InlineSource};

fn setup() -> (ConfigStore, InlineSource) {
    let source = InlineSource::new("beam-x: 1\n");
    let store = ConfigStore::load(&source).unwrap();
    (store, source)
}

#[test]
fn reload_reports_success_and_applies() {
    let (store, source) = setup();
    source.set("beam-x: 42\n");
    let outcome = handle_command(&store, &source, "distb", &["reload"]);
    assert_eq!(
        outcome,
        CommandOutcome::Handled("[DistanceBeam] Configuration reloaded.".to_string())
    );
    assert_eq!(store.current().target.x, 42.0);
}

#[test]
fn failed_reload_is_reported_and_not_applied() {
    let (store, source) = setup();
    source.set("beam-x: 42\nambient-sound: NOPE\n");
    match handle_command(&store, &source, "distb", &["reload"]) {
        CommandOutcome::Handled(message) => {
            assert!(message.starts_with("[DistanceBeam] Reload failed:"), "{message}");
            assert!(message.contains("NOPE"), "{message}");
        }
        CommandOutcome::NotHandled => panic!("reload should be handled"),
    }
    assert_eq!(store.current().target.x, 1.0);
}

#[test]
fn label_and_subcommand_are_case_insensitive() {
    let (store, source) = setup();
    assert!(matches!(
        handle_command(&store, &source, "DistB", &["ReLoad"]),
        CommandOutcome::Handled(_)
    ));
}

#[test]
fn anything_else_is_not_handled() {
    let (store, source) = setup();
    source.set("beam-x: 99\n");
    for (label, args) in [
        ("distb", &[][..]),
        ("distb", &["reload", "now"][..]),
        ("distb", &["status"][..]),
        ("beam", &["reload"][..]),
    ] {
        assert_eq!(
            handle_command(&store, &source, label, args),
            CommandOutcome::NotHandled,
            "{label} {args:?}"
        );
    }
    // None of those should have reloaded anything.
    assert_eq!(store.current().target.x, 1.0);
}

#[test]
fn console_lines_are_split_and_slash_is_optional() {
    let (store, source) = setup();
    assert!(matches!(
        handle_line(&store, &source, "  /distb   reload "),
        CommandOutcome::Handled(_)
    ));
    assert!(matches!(
        handle_line(&store, &source, "distb reload"),
        CommandOutcome::Handled(_)
    ));
    assert_eq!(handle_line(&store, &source, "   "), CommandOutcome::NotHandled);
}
