/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .arg("run")
        .arg("--quiet")
        .arg("--")
        .args(args)
        .output()
        .expect("Failed to execute cargo run")
}

#[test]
fn binary_shows_help() {
    let output = run(&["--help"]);

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("airtraffic"),
        "Help output should mention airtraffic"
    );
}

#[test]
fn binary_shows_version() {
    let output = run(&["--version"]);

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = run(&["nonexistent-command"]);

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn project_prints_pixel_position() {
    let output = run(&["project", "--lat", "0", "--lon", "0"]);

    assert!(
        output.status.success(),
        "project failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "345.012 276.112");
}

#[test]
fn project_accepts_negative_coordinates() {
    let output = run(&["project", "--lat", "-33.87", "--lon", "151.21"]);
    assert!(
        output.status.success(),
        "negative latitude rejected: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let coords: Vec<f64> = stdout
        .split_whitespace()
        .map(|v| v.parse().expect("numeric output"))
        .collect();
    assert_eq!(coords.len(), 2);
    // South-east of the origin
    assert!(coords[0] > 345.012);
    assert!(coords[1] > 276.112);
}

#[test]
fn print_mode_renders_frame() {
    let output = run(&["print", "--width", "40", "--height", "12", "--seed", "1"]);

    assert!(
        output.status.success(),
        "print failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 12);
    assert!(stdout.contains('▀'));
}
