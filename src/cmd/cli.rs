#[derive(Debug, Eq, PartialEq)]
pub enum Command {
    KeyGen,
    Encrypt,
    Decrypt,
    Sign,
    Verify,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Args {
    pub command: Option<Command>,
    /// Recipient/sender/signer/verifier keys passed with `-k`/`--key`, in
    /// the order given. `encrypt` accepts one per recipient; the other
    /// commands take exactly one.
    pub keys: Vec<String>,
    pub armor: bool,
    pub json: bool,
    pub short_help: bool,
    pub long_help: bool,
    pub version: bool,
}

impl Args {
    pub fn build_from_args<I>(mut cli_args: I) -> Result<Self, String>
    where
        I: Iterator<Item: AsRef<str> + ToString>,
    {
        let mut args = Self { armor: true, ..Self::default() };

        while let Some(arg) = cli_args.next() {
            let some_command = args.command.is_some();

            match arg.as_ref() {
                "keygen" if !some_command => args.command = Some(Command::KeyGen),
                "encrypt" if !some_command => args.command = Some(Command::Encrypt),
                "decrypt" if !some_command => args.command = Some(Command::Decrypt),
                "sign" if !some_command => args.command = Some(Command::Sign),
                "verify" if !some_command => args.command = Some(Command::Verify),
                "-k" | "--key" => {
                    let value = cli_args
                        .next()
                        .ok_or_else(|| "'-k/--key' expects a value".to_string())?;
                    args.keys.push(value.to_string());
                }
                "-a" | "--armor" => args.armor = true,
                "--no-armor" => args.armor = false,
                "--json" => args.json = true,
                "-h" => args.short_help = true,
                "--help" => args.long_help = true,
                "-V" | "--version" => args.version = true,
                unknown => {
                    return Err(format!("Unknown argument: '{unknown}'"));
                }
            }
        }

        Ok(args)
    }
}
