// Test intent: verifies the command-line harness output and exit status.
use std::process::Command;

fn sanity_check(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_sanity-check"))
        .args(args)
        .output()
        .expect("run sanity-check")
}

#[test]
fn reports_all_matching_for_power_of_two() {
    let out = sanity_check(&["1024"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Forwards FFT of size 1024"));
    assert!(stdout.contains("Backwards FFT of size 1024"));
    assert!(stdout.contains("Checked 1024 elements: 1024 match and 0 mismatched"));
}

#[test]
fn random_signal_with_small_chunks() {
    let out = sanity_check(&["256", "--random", "--seed", "5", "--chunk-size", "4"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Checked 256 elements: 256 match and 0 mismatched"));
}

#[test]
fn rejects_non_power_of_two() {
    let out = sanity_check(&["1000"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("1000 provided as domain size, but this must be a power of two"));
}

#[test]
fn rejects_undersized_staging() {
    let out = sanity_check(&["1024", "--chunk-size", "8", "--queue-capacity", "2"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("cannot stage"));
}
