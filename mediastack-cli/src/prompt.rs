//! Terminal prompts
//!
//! Setup asks two kinds of questions: a free-form line (the roots) and a
//! yes/no confirmation. [`Prompt`] keeps the pipeline independent of stdin
//! so tests can script the answers.

use std::io::{self, BufRead, Write};

pub trait Prompt {
    /// Ask for one line of input, returned without the line terminator.
    ///
    /// Returns `ErrorKind::UnexpectedEof` once input is closed.
    fn line(&mut self, message: &str) -> io::Result<String>;

    /// Ask a yes/no question. Empty or unrecognized input gives `default`.
    fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool>;

    /// Tell the user their answer was not usable.
    fn warn(&mut self, message: &str);
}

/// Prompt reading answers from `input` and writing questions to `output`
pub struct TerminalPrompt<R, W> {
    input: R,
    pub(crate) output: W,
    assume_yes: bool,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio(assume_yes: bool) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), assume_yes)
    }
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Questions on stderr, for commands whose stdout is the product
    pub fn stderr(assume_yes: bool) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), assume_yes)
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W, assume_yes: bool) -> Self {
        Self {
            input,
            output,
            assume_yes,
        }
    }

    fn read_answer(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn line(&mut self, message: &str) -> io::Result<String> {
        write!(self.output, "{message}: ")?;
        self.output.flush()?;

        self.read_answer()?
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"))
    }

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool> {
        let suffix = if default { "[Y/n]" } else { "[y/N]" };

        if self.assume_yes {
            writeln!(self.output, "{message} {suffix}: y")?;
            return Ok(true);
        }

        write!(self.output, "{message} {suffix}: ")?;
        self.output.flush()?;

        let Some(answer) = self.read_answer()? else {
            // EOF: nobody is there to answer
            writeln!(self.output)?;
            return Ok(default);
        };

        Ok(match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default,
        })
    }

    fn warn(&mut self, message: &str) {
        // Nothing useful to do if the terminal itself is gone
        let _ = writeln!(self.output, "  ⚠️  {message}");
    }
}
