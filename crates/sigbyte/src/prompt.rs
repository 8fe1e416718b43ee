//! Interactive sender input
//!
//! Invalid input is never fatal: the operator sees a diagnostic and is asked
//! again. Only a closed input stream ends the prompt loop.

use sigbyte_util::{PeerId, PeerIdError};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

pub const PEER_PROMPT: &str = "Enter receiver PID: ";
pub const VALUE_PROMPT: &str = "Enter message: ";

/// Rejected operator input; the message is what the operator sees
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Invalid or unavailable PID.")]
    InvalidPeer(#[from] PeerIdError),

    #[error("Invalid or unavailable PID.")]
    UnavailablePeer(PeerId),

    #[error("Invalid input. Please enter a valid number between 0 and 255.")]
    NotANumber,

    #[error("Invalid input. Please enter a number between 0 and 255.")]
    TrailingCharacters,

    #[error("Invalid number. Please enter a number between 0 and 255.")]
    OutOfRange(String),
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parse a message value: an optionally signed integer, leading whitespace
/// allowed, nothing after it, within 0..=255
pub fn parse_value(line: &str) -> Result<u8, InputError> {
    let s = strip_line_ending(line).trim_start();

    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digit_len = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digit_len == 0 {
        return Err(InputError::NotANumber);
    }

    let (number, rest) = s.split_at(sign_len + digit_len);
    if !rest.is_empty() {
        return Err(InputError::TrailingCharacters);
    }

    // Too many digits for any integer is malformed, not merely out of range
    let n: i64 = number.parse().map_err(|_| InputError::NotANumber)?;
    u8::try_from(n).map_err(|_| InputError::OutOfRange(number.to_string()))
}

/// Parse a peer id and check that it names a live process
pub fn check_peer(line: &str, is_alive: impl Fn(PeerId) -> bool) -> Result<PeerId, InputError> {
    let peer: PeerId = strip_line_ending(line).parse()?;
    if is_alive(peer) {
        Ok(peer)
    } else {
        Err(InputError::UnavailablePeer(peer))
    }
}

/// Line-oriented prompter over any reader/writer pair
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask for the receiver's pid until a live one is given
    pub fn peer(&mut self, is_alive: impl Fn(PeerId) -> bool) -> io::Result<PeerId> {
        loop {
            let line = self.ask(PEER_PROMPT)?;
            match check_peer(&line, &is_alive) {
                Ok(peer) => return Ok(peer),
                Err(e) => self.reject(&line, &e)?,
            }
        }
    }

    /// Ask for the value to send until a valid one is given
    pub fn value(&mut self) -> io::Result<u8> {
        loop {
            let line = self.ask(VALUE_PROMPT)?;
            match parse_value(&line) {
                Ok(value) => return Ok(value),
                Err(e) => self.reject(&line, &e)?,
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        // Blank lines are skipped silently, the answer may follow on a later line
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before a valid answer was given",
                ));
            }
            if !line.trim().is_empty() {
                return Ok(line);
            }
        }
    }

    fn reject(&mut self, line: &str, error: &InputError) -> io::Result<()> {
        debug!(input = strip_line_ending(line), error = ?error, "Input rejected");
        writeln!(self.output, "{}", error)
    }
}
