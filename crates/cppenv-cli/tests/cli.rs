//! End-to-end tests for the `cppenv` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A scratch project directory with an isolated cppenv home.
struct TestContext {
    temp_dir: TempDir,
    project: PathBuf,
    cppenv_home: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let project = temp_dir.path().join("demo");
        let cppenv_home = temp_dir.path().join(".cppenv-home");
        fs::create_dir_all(&project).expect("failed to create project dir");

        Self {
            temp_dir,
            project,
            cppenv_home,
        }
    }

    fn cppenv(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cppenv"));
        cmd.current_dir(&self.project);
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("CPPENV_HOME", &self.cppenv_home);
        cmd.env_remove("CPPENV_INDEX_URL");
        cmd.env_remove("CPPENV_PYTHON_MIRROR");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cppenv().args(args).output().expect("failed to run cppenv")
    }

    fn write_manifest(&self, content: &str) {
        fs::write(self.project.join("cppenv.toml"), content).unwrap();
    }

    fn bin_dir(&self) -> PathBuf {
        let bin = if cfg!(windows) { "Scripts" } else { "bin" };
        self.project.join(".cppenv").join("venv").join(bin)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[cfg(unix)]
fn write_executable(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Usage:"));
    for verb in ["init", "install", "run", "status", "toolchain"] {
        assert!(out.contains(verb), "help should list {verb}");
    }
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("cppenv "));
}

#[test]
fn test_completions_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("cppenv"));
}

#[test]
fn test_status_without_manifest() {
    let ctx = TestContext::new();
    let output = ctx.run(&["status"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No cppenv.toml found"));
}

#[test]
fn test_status_lists_tools_and_scripts() {
    let ctx = TestContext::new();
    ctx.write_manifest(
        "[project]\nname = \"demo\"\n\n[tools]\ncmake = \"3.28.1\"\n\n[scripts]\nbuild = \"cmake --build build\"\n",
    );

    let output = ctx.run(&["status"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("demo"));
    assert!(out.contains("3.28.1"));
    assert!(out.contains("cmake --build build"));
    assert!(out.contains("not installed"));
}

#[test]
fn test_install_without_manifest_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["install"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no cppenv.toml found, run 'cppenv init' first"));
}

#[test]
fn test_init_refuses_existing_manifest() {
    let ctx = TestContext::new();
    ctx.write_manifest("[project]\nname = \"demo\"\n");
    let output = ctx.run(&["init"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("cppenv.toml already exists"));
}

#[test]
fn test_init_pins_latest_versions() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", mockito::Matcher::Regex(r"^/pypi/[^/]+/json$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"info": {"version": "1.2.3"}}"#)
        .expect(5)
        .create();

    let ctx = TestContext::new();
    let output = ctx
        .cppenv()
        .args(["init", "--name", "widgets"])
        .env("CPPENV_INDEX_URL", server.url())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    mock.assert();

    let manifest = fs::read_to_string(ctx.project.join("cppenv.toml")).unwrap();
    assert!(manifest.contains("name = \"widgets\""));
    for tool in ["ziglang", "cmake", "ninja", "conan", "clang-tools"] {
        assert!(
            manifest.contains(&format!("{tool} = \"1.2.3\"")),
            "{tool} missing from {manifest}"
        );
    }
}

#[test]
fn test_init_fails_when_index_errors() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", mockito::Matcher::Any)
        .with_status(500)
        .create();

    let ctx = TestContext::new();
    let output = ctx.cppenv().arg("init").env("CPPENV_INDEX_URL", server.url()).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to get version for"));
    assert!(!ctx.project.join("cppenv.toml").exists());
}

#[test]
fn test_run_without_environment_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["run", "cmake", "--version"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("environment not found, run 'cppenv install' first"));
}

#[test]
fn test_toolchain_without_environment_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["toolchain"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("environment not found"));
}

#[test]
fn test_toolchain_writes_file() {
    let ctx = TestContext::new();
    fs::create_dir_all(ctx.bin_dir()).unwrap();

    let output = ctx.run(&["toolchain"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("CMAKE_TOOLCHAIN_FILE="));

    let content =
        fs::read_to_string(ctx.project.join(".cppenv").join("zig_toolchain.cmake")).unwrap();
    assert!(content.starts_with("# Generated by cppenv - do not edit manually"));
}

#[test]
fn test_run_missing_command_exits_one() {
    let ctx = TestContext::new();
    fs::create_dir_all(ctx.bin_dir()).unwrap();

    let output = ctx.run(&["run", "cppenv-test-no-such-tool"]);
    assert_eq!(output.status.code(), Some(1));
}

#[cfg(unix)]
#[test]
fn test_run_propagates_tool_exit_code() {
    let ctx = TestContext::new();
    write_executable(
        &ctx.bin_dir().join("toolA"),
        "#!/bin/sh\necho \"args: $@\"\nexit 3\n",
    );

    let output = ctx.run(&["run", "toolA", "--flag", "value"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).contains("args: --flag value"));
}

#[cfg(unix)]
#[test]
fn test_run_script_from_manifest() {
    let ctx = TestContext::new();
    write_executable(&ctx.bin_dir().join("toolA"), "#!/bin/sh\nexit \"$1\"\n");
    ctx.write_manifest("[project]\nname = \"demo\"\n\n[scripts]\ncheck = \"toolA\"\n");

    let output = ctx.run(&["run", "check", "5"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stdout(&output).contains("toolA"));
}

#[cfg(unix)]
#[test]
fn test_run_script_arguments_stay_literal() {
    let ctx = TestContext::new();
    write_executable(&ctx.bin_dir().join("countargs"), "#!/bin/sh\nexit $#\n");
    ctx.write_manifest("[project]\nname = \"demo\"\n\n[scripts]\ncheck = \"countargs\"\n");

    let output = ctx.run(&["run", "check", "a b", "$(echo one two)"]);
    assert_eq!(output.status.code(), Some(2));
}
