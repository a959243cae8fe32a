mod cmd;

use std::env;
use std::process;

use lessify::Pager;

use cmd::cli;

fn main() {
    let args = match cli::Args::build_from_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("fatal: {err}.");
            println!("Try '{bin} -h' for help.", bin = env!("CARGO_BIN_NAME"));
            process::exit(2);
        }
    };

    if args.long_help {
        long_help();
    } else if args.short_help {
        short_help();
    } else if args.version {
        version();
    } else if let Some(command) = args.command {
        let result = match command {
            cli::Command::KeyGen => cmd::genkey(args.json),
            cli::Command::Encrypt => cmd::encrypt(&args.keys, args.armor),
            cli::Command::Decrypt => cmd::decrypt(&args.keys),
            cli::Command::Sign => cmd::sign(&args.keys, args.armor),
            cli::Command::Verify => cmd::verify(&args.keys),
        };
        if let Err(code) = result {
            process::exit(code);
        }
    } else {
        // No arguments.
        short_help();
    }
}

fn short_help() {
    println!("{}", short_help_message());
    println!(
        "For full help, see `{bin} --help`.",
        bin = env!("CARGO_BIN_NAME")
    );
}

fn short_help_message() -> String {
    format!(
        "\
{description}

Usage: {bin} [<options>] <command> [<args>]

Commands:
  keygen                 Generate an encryption and a signing key pair
  encrypt                Encrypt stdin for one or more recipients
  decrypt                Decrypt a message read from stdin
  sign                   Attach a signature to stdin
  verify                 Verify a signed message read from stdin

Options:
  -k, --key <hex>        Key to use (repeatable for `encrypt`)
  -a, --armor            Wrap output in ASCII armor (default)
      --no-armor         Emit raw binary output
      --json             Print `keygen` output as JSON
  -h, --help             Show this message and exit
  -V, --version          Show the version and exit
",
        description = env!("CARGO_PKG_DESCRIPTION"),
        bin = env!("CARGO_BIN_NAME"),
    )
}

#[allow(clippy::too_many_lines)]
fn long_help() {
    Pager::page_or_print(&format!(
        "\
{help}
Keys

  Keys are passed as hex strings, optionally prefixed with `0x`, `pk_0x`
  or `sk_0x` (the prefix `{package}` itself prints, to tell public and
  secret keys apart at a glance; it is stripped before decoding). When
  `-k/--key` is omitted, `decrypt`, `sign` and `verify` fall back to the
  environment variables `SALTPACK_DECRYPT_SK`, `SALTPACK_SIGN_SK` and
  `SALTPACK_VERIFY_PK` respectively.

Encryption vs. signing

  `encrypt`/`decrypt` authenticate and hide a message for one or more
  recipients. `sign`/`verify` attach a signature to a message without
  hiding it; anyone can read it, but only the holder of the matching
  secret key could have produced it.
",
        help = short_help_message(),
        package = env!("CARGO_PKG_NAME"),
    ));
}

fn version() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}
