use std::io::{self, BufRead, Write};

use tokio::sync::oneshot;
use tracing::debug;

use super::classify::is_prime;

pub const PROMPT: &str = "-> ";
pub const NOT_A_NUMBER: &str = "Please enter a whole number!";

/// What the loop should do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reply(String),
}

pub fn intro(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Welcome to the prime number checker!")?;
    writeln!(
        out,
        "Enter a whole number, and we'll tell you if it's prime or not. Enter q to quit."
    )?;
    prompt(out)
}

pub fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "{}", PROMPT)?;
    out.flush()
}

/// Evaluate one line. Only the line ending is stripped; surrounding spaces
/// make the input unparsable.
pub fn check_numbers(line: &str) -> Command {
    let input = line.trim_end_matches(['\n', '\r']);

    if input.eq_ignore_ascii_case("q") {
        return Command::Quit;
    }

    match input.parse::<i64>() {
        Ok(n) => Command::Reply(is_prime(n).1),
        Err(e) => {
            debug!(input, error = %e, "not an integer");
            Command::Reply(NOT_A_NUMBER.to_string())
        }
    }
}

/// Run the read/evaluate/print loop until `q` or end of input, then report
/// the outcome on `done`. Nothing is read or written after that.
pub fn read_user_input<R, W>(input: R, out: W, done: oneshot::Sender<io::Result<()>>)
where
    R: BufRead,
    W: Write,
{
    let outcome = run(input, out);
    // The receiver may already be gone if the caller stopped waiting.
    let _ = done.send(outcome);
}

fn run<R: BufRead, W: Write>(mut input: R, mut out: W) -> io::Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("end of input");
            return Ok(());
        }

        match check_numbers(&line) {
            Command::Quit => return Ok(()),
            Command::Reply(msg) => {
                writeln!(out, "{}", msg)?;
                prompt(&mut out)?;
            }
        }
    }
}
