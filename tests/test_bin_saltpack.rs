mod utils;

use utils::{extract_key, run, run_with_stdin};

#[test]
fn short_help() {
    let output = run(&["-h"]);
    dbg!(&output);

    assert_eq!(output.exit_code, 0);
    assert!(output.stdout.contains(env!("CARGO_PKG_DESCRIPTION")));
    assert!(output.stdout.contains("keygen"));
    assert!(output.stdout.contains("encrypt"));
    assert!(output.stdout.contains("decrypt"));
    assert!(output.stdout.contains("sign"));
    assert!(output.stdout.contains("verify"));
    assert!(output.stdout.contains("-h, --help"));
    assert!(output.stdout.contains("-V, --version"));
}

#[test]
fn long_help() {
    let output = run(&["--help"]);
    dbg!(&output);

    assert_eq!(output.exit_code, 0);
    assert!(output.stdout.contains(env!("CARGO_PKG_DESCRIPTION")));
    assert!(output.stdout.contains("Keys"));
    assert!(output.stdout.contains("SALTPACK_DECRYPT_SK"));
}

#[test]
fn version() {
    let output = run(&["--version"]);
    dbg!(&output);

    assert_eq!(output.exit_code, 0);
    assert!(output.stdout.contains(env!("CARGO_PKG_NAME")));
    assert!(output.stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_argument_exits_with_usage_error() {
    let output = run(&["--not-a-real-flag"]);
    dbg!(&output);

    assert_eq!(output.exit_code, 2);
    assert!(output.stderr.contains("fatal"));
}

#[test]
fn keygen_prints_all_four_keys() {
    let output = run(&["keygen"]);
    dbg!(&output);

    assert_eq!(output.exit_code, 0);
    assert!(output.stdout.contains("SALTPACK_ENCRYPT_PK=pk_0x"));
    assert!(output.stdout.contains("SALTPACK_DECRYPT_SK=sk_0x"));
    assert!(output.stdout.contains("SALTPACK_VERIFY_PK=pk_0x"));
    assert!(output.stdout.contains("SALTPACK_SIGN_SK=sk_0x"));
}

#[test]
fn keygen_json_is_well_formed_enough_to_grep() {
    let output = run(&["keygen", "--json"]);
    dbg!(&output);

    assert_eq!(output.exit_code, 0);
    assert!(output.stdout.trim_start().starts_with('{'));
    assert!(output.stdout.contains("\"SALTPACK_ENCRYPT_PK\""));
}

#[test]
fn encrypt_then_decrypt_round_trips_a_message() {
    let keys = run(&["keygen"]);
    let enc_pk = extract_key(&keys.stdout, "SALTPACK_ENCRYPT_PK");
    let enc_sk = extract_key(&keys.stdout, "SALTPACK_DECRYPT_SK");

    let encrypted = run_with_stdin(&["encrypt", "-k", &enc_pk], b"Hello, Saltpack!");
    dbg!(&encrypted);
    assert_eq!(encrypted.exit_code, 0);
    assert!(encrypted.stdout.starts_with("BEGIN SALTPACK ENCRYPTED MESSAGE."));

    let decrypted = run_with_stdin(&["decrypt", "-k", &enc_sk], encrypted.stdout.as_bytes());
    dbg!(&decrypted);
    assert_eq!(decrypted.exit_code, 0);
    assert_eq!(decrypted.stdout, "Hello, Saltpack!");
}

#[test]
fn encrypt_then_decrypt_round_trips_an_empty_message() {
    let keys = run(&["keygen"]);
    let enc_pk = extract_key(&keys.stdout, "SALTPACK_ENCRYPT_PK");
    let enc_sk = extract_key(&keys.stdout, "SALTPACK_DECRYPT_SK");

    let encrypted = run_with_stdin(&["encrypt", "-k", &enc_pk], b"");
    assert_eq!(encrypted.exit_code, 0);

    let decrypted = run_with_stdin(&["decrypt", "-k", &enc_sk], encrypted.stdout.as_bytes());
    assert_eq!(decrypted.exit_code, 0);
    assert_eq!(decrypted.stdout, "");
}

#[test]
fn encrypt_to_multiple_recipients_each_decrypt_the_same_plaintext() {
    let keys_x = run(&["keygen"]);
    let keys_y = run(&["keygen"]);
    let keys_z = run(&["keygen"]);
    let enc_pk_x = extract_key(&keys_x.stdout, "SALTPACK_ENCRYPT_PK");
    let enc_pk_y = extract_key(&keys_y.stdout, "SALTPACK_ENCRYPT_PK");
    let enc_pk_z = extract_key(&keys_z.stdout, "SALTPACK_ENCRYPT_PK");

    let encrypted = run_with_stdin(
        &["encrypt", "-k", &enc_pk_x, "-k", &enc_pk_y, "-k", &enc_pk_z],
        b"Hello, Saltpack!",
    );
    dbg!(&encrypted);
    assert_eq!(encrypted.exit_code, 0);

    for keys in [&keys_x, &keys_y, &keys_z] {
        let enc_sk = extract_key(&keys.stdout, "SALTPACK_DECRYPT_SK");
        let decrypted = run_with_stdin(&["decrypt", "-k", &enc_sk], encrypted.stdout.as_bytes());
        assert_eq!(decrypted.exit_code, 0);
        assert_eq!(decrypted.stdout, "Hello, Saltpack!");
    }
}

#[test]
fn decrypting_with_the_wrong_key_fails() {
    let keys_a = run(&["keygen"]);
    let enc_pk_a = extract_key(&keys_a.stdout, "SALTPACK_ENCRYPT_PK");

    let keys_b = run(&["keygen"]);
    let enc_sk_b = extract_key(&keys_b.stdout, "SALTPACK_DECRYPT_SK");

    let encrypted = run_with_stdin(&["encrypt", "-k", &enc_pk_a], b"for a, not b");
    assert_eq!(encrypted.exit_code, 0);

    let decrypted = run_with_stdin(&["decrypt", "-k", &enc_sk_b], encrypted.stdout.as_bytes());
    dbg!(&decrypted);
    assert_eq!(decrypted.exit_code, 1);
    assert!(decrypted.stderr.contains("recipient"));
}

#[test]
fn decrypt_falls_back_to_the_environment_variable() {
    let keys = run(&["keygen"]);
    let enc_pk = extract_key(&keys.stdout, "SALTPACK_ENCRYPT_PK");
    let enc_sk = extract_key(&keys.stdout, "SALTPACK_DECRYPT_SK");

    let encrypted = run_with_stdin(&["encrypt", "-k", &enc_pk, "--no-armor"], b"env fallback");

    let mut command = std::process::Command::new(env!("CARGO_BIN_EXE_saltpack"));
    command
        .arg("decrypt")
        .env("NO_COLOR", "1")
        .env("SALTPACK_DECRYPT_SK", enc_sk)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());

    let mut child = command.spawn().unwrap();
    {
        use std::io::Write;
        child.stdin.take().unwrap().write_all(&encrypted.stdout.into_bytes()).unwrap();
    }
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code().unwrap(), 0);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "env fallback");
}

#[test]
fn sign_then_verify_round_trips_a_message() {
    let keys = run(&["keygen"]);
    let sig_pk = extract_key(&keys.stdout, "SALTPACK_VERIFY_PK");
    let sig_sk = extract_key(&keys.stdout, "SALTPACK_SIGN_SK");

    let signed = run_with_stdin(&["sign", "-k", &sig_sk], b"attached and signed");
    dbg!(&signed);
    assert_eq!(signed.exit_code, 0);
    assert!(signed.stdout.starts_with("BEGIN SALTPACK SIGNED MESSAGE."));

    let verified = run_with_stdin(&["verify", "-k", &sig_pk], signed.stdout.as_bytes());
    dbg!(&verified);
    assert_eq!(verified.exit_code, 0);
    assert_eq!(verified.stdout, "attached and signed");
}

#[test]
fn verify_rejects_a_tampered_signature() {
    let keys = run(&["keygen"]);
    let sig_pk = extract_key(&keys.stdout, "SALTPACK_VERIFY_PK");
    let sig_sk = extract_key(&keys.stdout, "SALTPACK_SIGN_SK");

    let signed = run_with_stdin(&["sign", "-k", &sig_sk, "--no-armor"], b"do not tamper");
    let mut tampered = signed.stdout.clone().into_bytes();
    let last = tampered.len() - 1;
    tampered[last] ^= 0xff;

    let verified = run_with_stdin(&["verify", "-k", &sig_pk], &tampered);
    dbg!(&verified);
    assert_eq!(verified.exit_code, 1);
}

#[test]
fn verify_rejects_the_wrong_expected_signer() {
    let keys_a = run(&["keygen"]);
    let sig_sk_a = extract_key(&keys_a.stdout, "SALTPACK_SIGN_SK");

    let keys_b = run(&["keygen"]);
    let sig_pk_b = extract_key(&keys_b.stdout, "SALTPACK_VERIFY_PK");

    let signed = run_with_stdin(&["sign", "-k", &sig_sk_a], b"signed by a");
    let verified = run_with_stdin(&["verify", "-k", &sig_pk_b], signed.stdout.as_bytes());

    dbg!(&verified);
    assert_eq!(verified.exit_code, 1);
    assert!(verified.stderr.contains("signer"));
}
