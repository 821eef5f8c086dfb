//! Line-oriented prompt on stdin

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

/// Reads answers from an input after writing a prompt to an output
pub struct Prompt<R, W> {
    lines: Lines<R>,
    output: W,
}

impl Prompt<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Prompt<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            lines: input.lines(),
            output,
        }
    }

    /// Trimmed answer, or `None` once the input is closed
    pub async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.output.write_all(question.as_bytes()).await?;
        self.output.flush().await?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

/// Menu choice of the issuer demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    IssueCredential,
    SendProofRequest,
    SendMessage,
    Exit,
}

pub const MENU: &str =
    "(1) Issue Credential, (2) Send Proof Request, (3) Send Message (X) Exit? [1/2/3/X] ";

impl MenuOption {
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim() {
            "1" => Some(MenuOption::IssueCredential),
            "2" => Some(MenuOption::SendProofRequest),
            "3" => Some(MenuOption::SendMessage),
            "" | "x" | "X" => Some(MenuOption::Exit),
            _ => None,
        }
    }
}
