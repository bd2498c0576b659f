use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use posturator::auth::{
    AuthApi, AuthError, AuthSession, FileTokenStore, HttpAuthClient, RegistrationForm, TokenStore,
};
use posturator::catalog;
use posturator::config::AppConfig;
use posturator::error::AppError;

pub type CliSession = AuthSession<HttpAuthClient, FileTokenStore>;

/// How passwords are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// Raw-mode keystrokes on an interactive terminal, nothing echoed.
    Hidden,
    /// Plain lines, for piped input.
    Visible,
}

impl Echo {
    pub fn detect() -> Self {
        if io::stdin().is_terminal() {
            Echo::Hidden
        } else {
            Echo::Visible
        }
    }
}

/// Restore the stored sign-in for this machine.
pub fn open_session(config: &AppConfig) -> Result<CliSession, AppError> {
    let client = HttpAuthClient::new(config.api.base_url.clone(), config.api.timeout)?;
    let store = FileTokenStore::new(config.storage.token_path()?);
    Ok(AuthSession::load(Arc::new(client), Arc::new(store))?)
}

/// Errors the user can fix by trying again are printed, not raised.
fn report_or_raise<W: Write>(output: &mut W, error: AuthError) -> Result<(), AppError> {
    match error {
        AuthError::Rejected(message)
        | AuthError::Unauthorized(message)
        | AuthError::InvalidForm(message) => writeln!(output, "{message}")?,
        AuthError::TokenExpired => writeln!(output, "{error}")?,
        other => return Err(other.into()),
    }
    Ok(())
}

pub async fn login<A, S, R, W>(
    session: &mut AuthSession<A, S>,
    input: &mut R,
    output: &mut W,
    username: Option<String>,
    echo: Echo,
) -> Result<bool, AppError>
where
    A: AuthApi,
    S: TokenStore,
    R: BufRead,
    W: Write,
{
    let username = match username {
        Some(username) => username,
        None => read_field(input, output, "Username")?,
    };
    let password = read_secret(input, output, "Password", echo)?;

    match session.login(&username, &password).await {
        Ok(claims) => {
            writeln!(output, "Signed in as {} ({})", claims.username, claims.role)?;
            Ok(true)
        }
        Err(error) => {
            report_or_raise(output, error)?;
            Ok(false)
        }
    }
}

pub async fn register<A, S, R, W>(
    session: &mut AuthSession<A, S>,
    input: &mut R,
    output: &mut W,
    echo: Echo,
) -> Result<bool, AppError>
where
    A: AuthApi,
    S: TokenStore,
    R: BufRead,
    W: Write,
{
    let form = RegistrationForm {
        username: read_field(input, output, "Username")?,
        email: read_field(input, output, "Email")?,
        password: read_secret(input, output, "Password", echo)?,
        confirm_password: read_secret(input, output, "Confirm password", echo)?,
    };

    match session.register(&form).await {
        Ok(Some(claims)) => {
            writeln!(output, "Account created. Signed in as {}", claims.username)?;
            Ok(true)
        }
        Ok(None) => {
            writeln!(output, "Account created. Sign in with `posturator login`.")?;
            Ok(true)
        }
        Err(error) => {
            report_or_raise(output, error)?;
            Ok(false)
        }
    }
}

pub fn logout<A, S, W>(session: &mut AuthSession<A, S>, output: &mut W) -> Result<(), AppError>
where
    A: AuthApi,
    S: TokenStore,
    W: Write,
{
    session.logout()?;
    writeln!(output, "Signed out.")?;
    Ok(())
}

pub fn whoami<A, S, W>(session: &AuthSession<A, S>, output: &mut W) -> io::Result<()>
where
    A: AuthApi,
    S: TokenStore,
    W: Write,
{
    match session.claims() {
        Some(claims) => writeln!(
            output,
            "{} <{}> role={}",
            claims.username, claims.email, claims.role
        ),
        None => writeln!(output, "Not signed in."),
    }
}

pub fn print_products<W: Write>(output: &mut W) -> io::Result<()> {
    for product in catalog::products() {
        writeln!(
            output,
            "{:<18} {:>8}  {}",
            product.name,
            product.price_label(),
            product.description
        )?;
    }
    Ok(())
}

fn read_field<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<String> {
    write!(output, "{label}: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn read_secret<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    echo: Echo,
) -> io::Result<String> {
    if echo == Echo::Visible {
        return read_field(input, output, label);
    }

    write!(output, "{label}: ")?;
    output.flush()?;
    terminal::enable_raw_mode()?;
    let secret = read_hidden_keys();
    terminal::disable_raw_mode()?;
    writeln!(output)?;
    secret
}

fn read_hidden_keys() -> io::Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "input cancelled"));
            }
            KeyCode::Char(ch) => secret.push(ch),
            _ => {}
        }
    }
}
