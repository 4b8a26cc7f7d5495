/*!
 * Operator interaction
 *
 * The engine asks an [`Operator`] for one decision per group. The terminal
 * implementation renders the group and reads a number from a line-oriented
 * input; tests substitute in-memory readers and writers.
 */

use console::style;
use std::io::{BufRead, Write};

use crate::config::ResolveMode;
use crate::error::{DupError, Result};
use crate::manifest::Group;
use crate::resolve::decision::{Decision, DELETE_ALL_CHOICE, SKIP_CHOICE};

const DELETE_PROMPT: &str = "Enter the path number to preserve, will DELETE others: ";
const LINK_PROMPT: &str = "Enter the path number to preserve, will LINK others to that: ";

/// Source of per-group decisions
pub trait Operator {
    /// Present `group` and return the operator's decision
    fn choose(&mut self, group: &Group<'_>, mode: ResolveMode) -> Result<Decision>;
}

/// Interactive operator on a line-oriented reader and writer
pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Operator bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer, e.g. to inspect what was rendered
    pub fn into_output(self) -> W {
        self.output
    }

    fn render(&mut self, group: &Group<'_>, mode: ResolveMode) -> std::io::Result<()> {
        writeln!(
            self.output,
            "\n\t{} {}",
            style("HASH:").bold(),
            style(group.hash_str()).cyan()
        )?;
        for (index, record) in group.members().iter().enumerate() {
            writeln!(
                self.output,
                " {}  {}  {} {}",
                style(index).bold(),
                record.path().display(),
                record.inode(),
                record.kind()
            )?;
        }
        if group.excess() > 0 {
            writeln!(
                self.output,
                " {}",
                style(format!(
                    "(+{} more members not shown; they will be left untouched)",
                    group.excess()
                ))
                .yellow()
            )?;
        }
        self.prompt(mode)
    }

    fn prompt(&mut self, mode: ResolveMode) -> std::io::Result<()> {
        let text = if mode.links() {
            LINK_PROMPT
        } else {
            DELETE_PROMPT
        };
        write!(
            self.output,
            "{}\n(Enter {} to ignore this group.)\n(Enter {} to delete all of this group.)\n(Enter any other number to quit.)\n",
            text, SKIP_CHOICE, DELETE_ALL_CHOICE
        )?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn choose(&mut self, group: &Group<'_>, mode: ResolveMode) -> Result<Decision> {
        self.render(group, mode)
            .map_err(|e| DupError::Prompt(format!("cannot render group: {}", e)))?;

        loop {
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| DupError::Prompt(format!("cannot read choice: {}", e)))?;

            // End of input means nobody is left to answer
            if read == 0 {
                return Ok(Decision::Abort);
            }

            if let Some(decision) = Decision::parse(&line, group.len()) {
                return Ok(decision);
            }

            writeln!(
                self.output,
                "{} {:?} is not a number.",
                style("!").yellow().bold(),
                line.trim()
            )
            .and_then(|_| self.prompt(mode))
            .map_err(|e| DupError::Prompt(format!("cannot render prompt: {}", e)))?;
        }
    }
}
