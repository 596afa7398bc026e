use anyhow::{Result, bail};
use std::ffi::OsString;
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "BCRYPT_PASSWORD";

/// Longest stdin line read without reallocating the password buffer.
const LINE_CAPACITY: usize = 256;

/// Reads the password to check.
///
/// Sources, in order: `BCRYPT_PASSWORD`, one line of piped stdin, an
/// interactive prompt. The password is kept as raw bytes, so values that are
/// not valid UTF-8 pass through unchanged. An empty password is valid for
/// bcrypt.
pub fn read_password() -> Result<Zeroizing<Vec<u8>>> {
    if let Some(pw) = from_env_or_pipe()? {
        return Ok(pw);
    }

    prompt("Password: ")
}

/// Reads a password to hash, asking twice on a terminal.
pub fn read_new_password() -> Result<Zeroizing<Vec<u8>>> {
    if let Some(pw) = from_env_or_pipe()? {
        return Ok(pw);
    }

    let pw1 = prompt("New password: ")?;
    let pw2 = prompt("Confirm password: ")?;

    if pw1 != pw2 {
        bail!("passwords do not match");
    }

    Ok(pw1)
}

fn prompt(message: &str) -> Result<Zeroizing<Vec<u8>>> {
    Ok(Zeroizing::new(rpassword::prompt_password(message)?.into_bytes()))
}

fn from_env_or_pipe() -> Result<Option<Zeroizing<Vec<u8>>>> {
    //  BCRYPT_PASSWORD="supersecret" bcrypt-core hash
    if let Some(pw) = std::env::var_os(PASSWORD_ENV) {
        return env_bytes(pw).map(Some);
    }

    //  printf "%s\n" "supersecret" | bcrypt-core verify '$2b$...'
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(Vec::with_capacity(LINE_CAPACITY));
        if io::stdin().lock().read_until(b'\n', &mut buf)? == 0 {
            bail!("no password provided");
        }
        trim_line_ending(&mut buf);
        return Ok(Some(buf));
    }

    Ok(None)
}

#[cfg(unix)]
fn env_bytes(value: OsString) -> Result<Zeroizing<Vec<u8>>> {
    use std::os::unix::ffi::OsStringExt;

    Ok(Zeroizing::new(value.into_vec()))
}

#[cfg(not(unix))]
fn env_bytes(value: OsString) -> Result<Zeroizing<Vec<u8>>> {
    match value.into_string() {
        Ok(pw) => Ok(Zeroizing::new(pw.into_bytes())),
        Err(_) => bail!("{PASSWORD_ENV} is not valid Unicode"),
    }
}

fn trim_line_ending(buf: &mut Vec<u8>) {
    while let Some(b'\n' | b'\r') = buf.last() {
        buf.pop();
    }
}
