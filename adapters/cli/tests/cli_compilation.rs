use std::process::Command;

const FLAGS: [&str; 10] = [
    "--config",
    "--seed",
    "--columns",
    "--rows",
    "--layout",
    "--script",
    "--ticks",
    "--render-every",
    "--save",
    "--load",
];

#[test]
fn binary_builds_and_documents_every_flag() {
    let check = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "maze-quest"])
        .status()
        .expect("cargo is available");
    assert!(check.success(), "maze-quest binary does not build");

    let help = Command::new(env!("CARGO_BIN_EXE_maze-quest"))
        .arg("--help")
        .output()
        .expect("maze-quest launches");
    assert!(help.status.success());

    let usage = String::from_utf8_lossy(&help.stdout);
    let missing: Vec<_> = FLAGS
        .iter()
        .filter(|flag| !usage.contains(*flag))
        .collect();
    assert!(missing.is_empty(), "--help omits {missing:?}:\n{usage}");
}

#[test]
fn unknown_flags_are_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_maze-quest"))
        .arg("--turbo")
        .output()
        .expect("maze-quest launches");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--turbo"));
}
