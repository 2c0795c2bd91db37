//! Device script parsing.
//!
//! One step per line:
//!
//! ```text
//! write DEV OFFSET TEXT...
//! read DEV OFFSET LEN
//! trim DEV
//! size DEV
//! list
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Everything after
//! the offset of a `write` is written verbatim.

use std::str::FromStr;
use thiserror::Error;

/// One script step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Write `data` to `device` starting at `offset`.
    Write {
        /// Target device.
        device: usize,
        /// Starting byte offset.
        offset: u64,
        /// Bytes to write.
        data: Vec<u8>,
    },
    /// Read up to `len` bytes from `device` starting at `offset`.
    Read {
        /// Source device.
        device: usize,
        /// Starting byte offset.
        offset: u64,
        /// Maximum bytes to read.
        len: usize,
    },
    /// Empty `device`.
    Trim {
        /// Target device.
        device: usize,
    },
    /// Print the logical size of `device`.
    Size {
        /// Target device.
        device: usize,
    },
    /// Print the chain listing of every device.
    List,
}

/// A malformed script line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// What was wrong.
    pub message: String,
}

/// Parses a whole script into numbered steps.
pub fn parse(text: &str) -> Result<Vec<(usize, Step)>, ParseError> {
    let mut steps = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step = parse_step(trimmed).map_err(|message| ParseError { line, message })?;
        steps.push((line, step));
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<Step, String> {
    let (command, rest) = next_word(line);
    match command {
        "write" => {
            let (device, rest) = number(rest, "device")?;
            let (offset, data) = number(rest, "offset")?;
            if data.is_empty() {
                return Err("write needs data after the offset".to_string());
            }
            Ok(Step::Write {
                device,
                offset,
                data: data.as_bytes().to_vec(),
            })
        }
        "read" => {
            let (device, rest) = number(rest, "device")?;
            let (offset, rest) = number(rest, "offset")?;
            let (len, rest) = number(rest, "length")?;
            no_trailing(rest)?;
            Ok(Step::Read {
                device,
                offset,
                len,
            })
        }
        "trim" => {
            let (device, rest) = number(rest, "device")?;
            no_trailing(rest)?;
            Ok(Step::Trim { device })
        }
        "size" => {
            let (device, rest) = number(rest, "device")?;
            no_trailing(rest)?;
            Ok(Step::Size { device })
        }
        "list" => {
            no_trailing(rest)?;
            Ok(Step::List)
        }
        other => Err(format!("unknown command `{other}`")),
    }
}

/// Splits off the first whitespace-delimited word.
fn next_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

fn number<'a, T: FromStr>(s: &'a str, what: &str) -> Result<(T, &'a str), String> {
    let (word, rest) = next_word(s);
    if word.is_empty() {
        return Err(format!("missing {what}"));
    }
    let value = word
        .parse()
        .map_err(|_| format!("bad {what} `{word}`"))?;
    Ok((value, rest))
}

fn no_trailing(rest: &str) -> Result<(), String> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(format!("unexpected `{rest}`"))
    }
}
