//! Interactive color input

use std::io::{self, BufRead, Write};

/// Source of typed color channel values
pub trait ColorPrompt: Send {
    /// Ask for one channel (`"R"`, `"G"` or `"B"`). `None` on EOF or read failure.
    fn read_channel(&mut self, label: &str) -> Option<String>;
}

/// Prompt on stdout, read from stdin
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl ColorPrompt for StdinPrompt {
    fn read_channel(&mut self, label: &str) -> Option<String> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{}:", label).ok()?;
        out.flush().ok()?;
        read_line(&mut io::stdin().lock())
    }
}

/// Prompt over any reader/writer pair
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LinePrompt { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead + Send, W: Write + Send> ColorPrompt for LinePrompt<R, W> {
    fn read_channel(&mut self, label: &str) -> Option<String> {
        writeln!(self.output, "{}:", label).ok()?;
        read_line(&mut self.input)
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

/// Parse the leading integer of a line.
///
/// Leading whitespace is skipped, an optional sign and the following digits
/// are taken and anything after them is ignored (`"12abc"` is 12). No digits,
/// or a value outside `i32`, is malformed.
pub fn parse_leading_int(text: &str) -> Option<i32> {
    let s = text.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}
