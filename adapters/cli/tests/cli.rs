use std::process::{Command, Output};

fn pawn_defence(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pawn-defence"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch the pawn-defence binary")
}

#[test]
fn short_run_prints_banner_and_summary() {
    let output = pawn_defence(&["--seconds", "5", "--seed", "3"]);
    assert!(output.status.success(), "run failed: {output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.starts_with("Welcome to Pawn Defence."));
    assert!(stdout.contains("simulated 5.0s, reached wave "));
    assert!(stdout.contains("pieces spawned: "));
    assert!(stdout.trim_end().ends_with("still standing"));
}

#[test]
fn zero_tick_length_is_rejected() {
    let output = pawn_defence(&["--tick-ms", "0"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(stderr.contains("--tick-ms must be positive"));
}
