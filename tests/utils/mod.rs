#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Stdio};

const SALTPACK: &str = env!("CARGO_BIN_EXE_saltpack");

#[derive(Debug)]
pub struct Output {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn run(args: &[&str]) -> Output {
    run_with_stdin(args, b"")
}

pub fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut command = Command::new(SALTPACK);
    command.env("NO_COLOR", "1");
    command.env_remove("PAGER");
    command.env_remove("SALTPACK_DECRYPT_SK");
    command.env_remove("SALTPACK_SIGN_SK");
    command.env_remove("SALTPACK_VERIFY_PK");
    command.env_remove("SALTPACK_ENCRYPT_PK");
    command.args(args);
    command.stdin(Stdio::piped());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = command.spawn().unwrap();
    child.stdin.take().unwrap().write_all(stdin).unwrap();

    let output = child.wait_with_output().unwrap();

    Output {
        exit_code: output.status.code().unwrap(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Pull a `KEY=value` line out of `keygen`'s default output.
pub fn extract_key(stdout: &str, label: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(&format!("{label}=")))
        .unwrap_or_else(|| panic!("{label} not found in keygen output:\n{stdout}"))
        .to_string()
}
