use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn codeshot_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("codeshot").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("WAYLAND_DISPLAY");
    cmd
}

#[test]
fn codeshot_help_prints_usage() {
    let temp = TempDir::new().unwrap();
    codeshot_cmd(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Render styled source code selections to images",
        ));
}

#[test]
fn formats_are_listed_in_ordinal_order() {
    let temp = TempDir::new().unwrap();
    codeshot_cmd(&temp)
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)0\s+PNG.*1\s+JPEG.*2\s+BMP.*3\s+SVG").unwrap())
        .stdout(predicate::str::contains("image/svg+xml"));
}

#[test]
fn render_requires_an_input() {
    let temp = TempDir::new().unwrap();
    codeshot_cmd(&temp)
        .arg("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn empty_text_is_an_empty_selection() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("empty.txt");
    std::fs::write(&input, "").unwrap();

    codeshot_cmd(&temp)
        .args(["render", "--text"])
        .arg(&input)
        .arg("--output-dir")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Selection is empty"));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn unknown_format_is_rejected() {
    let temp = TempDir::new().unwrap();
    codeshot_cmd(&temp)
        .args(["render", "--text", "-", "--format", "gif"])
        .write_stdin("fn main() {}\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown image format"));
}

#[test]
fn disabling_every_destination_has_nothing_to_do() {
    let temp = TempDir::new().unwrap();
    codeshot_cmd(&temp)
        .args(["render", "--text", "-", "--no-save", "--no-clipboard"])
        .write_stdin("x\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to do"));
}

#[test]
fn file_only_render_prints_saved_path() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");

    codeshot_cmd(&temp)
        .args(["render", "--text", "-", "--no-clipboard", "--line-numbers"])
        .args(["--set", "filename_template=snippet", "--output-dir"])
        .arg(&out)
        .write_stdin("fn main() {}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("snippet.png"));

    let saved: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert_eq!(saved.len(), 1);
}

#[test]
fn output_dir_that_is_a_file_fails() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("shots");
    std::fs::write(&blocker, "occupied").unwrap();

    codeshot_cmd(&temp)
        .args(["render", "--text", "-", "--output-dir"])
        .arg(&blocker)
        .write_stdin("let x = 1;\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
    assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "occupied");
}

#[test]
fn init_config_writes_example_once() {
    let temp = TempDir::new().unwrap();
    codeshot_cmd(&temp)
        .arg("init-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
    let written = std::fs::read_to_string(temp.path().join("codeshot/config.toml")).unwrap();
    assert!(written.contains("[render]"));

    codeshot_cmd(&temp)
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
