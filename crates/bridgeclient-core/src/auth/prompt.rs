use std::io::{self, BufRead, Write};

/// Source of credentials when neither the caller nor the config file has them.
///
/// The connector asks for a username only when no email is known, and for a
/// password whenever one is missing. A password saved by "remember me" is
/// offered through `use_stored_password` before `password` is called.
pub trait CredentialPrompt {
    fn username(&self) -> io::Result<String>;
    fn password(&self, username: &str) -> io::Result<String>;

    fn use_stored_password(&self, _username: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Interactive prompt on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn username(&self) -> io::Result<String> {
        print!("Username: ");
        io::stdout().flush()?;

        let mut username = String::new();
        io::stdin().lock().read_line(&mut username)?;
        Ok(username.trim().to_string())
    }

    fn password(&self, _username: &str) -> io::Result<String> {
        rpassword::prompt_password("Password: ")
    }

    fn use_stored_password(&self, _username: &str) -> io::Result<bool> {
        print!("Use stored password? [Y/n]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim().to_lowercase() != "n")
    }
}
