//! Front-end runner - main event loop.
//!
//! The `FrontendRunner` owns the session controller, the mounted view and the
//! output. It runs the loop: wait for an event (input line, Ctrl+C, transport
//! completion) → apply it to the session → render → repeat.

use std::io::Write;

use colored::*;
use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::render::render_error;
use crate::session::{Applied, SessionController, SubmitOutcome};
use crate::tools::Mount;

use super::events::{Event, HELP_TEXT, Input};

/// Where interrupt requests come from
#[derive(Debug)]
enum Interrupts {
    /// Process Ctrl+C
    Signal,
    /// Caller-supplied channel, one message per interrupt
    Channel(mpsc::UnboundedReceiver<()>),
    Disabled,
}

/// Forward every Ctrl+C into a channel, keeping one listener armed for the
/// whole run
fn spawn_signal_forwarder() -> (mpsc::UnboundedReceiver<()>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    (rx, handle)
}

/// Resolves on the next interrupt; never resolves without a source
async fn next_interrupt(source: &mut Option<mpsc::UnboundedReceiver<()>>) {
    if let Some(rx) = source {
        if rx.recv().await.is_some() {
            return;
        }
        *source = None;
    }
    std::future::pending::<()>().await
}

/// Line-oriented front end for one tool session.
pub struct FrontendRunner<'a, W: Write> {
    session: SessionController,
    mount: Mount<'a>,
    out: W,
    interrupts: Interrupts,
}

impl<'a, W: Write> FrontendRunner<'a, W> {
    pub fn new(session: SessionController, mount: Mount<'a>, out: W) -> Self {
        Self {
            session,
            mount,
            out,
            interrupts: Interrupts::Signal,
        }
    }

    /// Take interrupts from `rx` instead of Ctrl+C
    pub fn with_interrupts(mut self, rx: mpsc::UnboundedReceiver<()>) -> Self {
        self.interrupts = Interrupts::Channel(rx);
        self
    }

    /// Do not listen for interrupts at all
    pub fn without_interrupts(mut self) -> Self {
        self.interrupts = Interrupts::Disabled;
        self
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Consume the runner, returning the output writer
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until quit, an interrupt with nothing in flight, or end of input.
    ///
    /// At end of input an in-flight request is awaited and rendered first, so
    /// `echo "prompt" | promptlab run <slug>` works as a one-shot. An
    /// interrupt during that wait cancels the request. The interrupt source is
    /// consumed by the first run.
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("Starting front end for '{}'", self.session.descriptor().id);
        self.banner()?;

        if !self.mount.is_supported() {
            let text = self.mount.render(self.session.state());
            writeln!(self.out, "{}", text)?;
            self.out.flush()?;
            return Ok(());
        }

        self.render()?;

        let (mut interrupts, forwarder) =
            match std::mem::replace(&mut self.interrupts, Interrupts::Disabled) {
                Interrupts::Signal => {
                    let (rx, handle) = spawn_signal_forwarder();
                    (Some(rx), Some(handle))
                }
                Interrupts::Channel(rx) => (Some(rx), None),
                Interrupts::Disabled => (None, None),
            };

        let result = self.event_loop(input.lines(), &mut interrupts).await;

        if let Some(handle) = forwarder {
            handle.abort();
        }

        info!("Front end for '{}' ended", self.session.descriptor().id);
        result
    }

    async fn event_loop<R>(
        &mut self,
        mut lines: tokio::io::Lines<R>,
        interrupts: &mut Option<mpsc::UnboundedReceiver<()>>,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        loop {
            let event = tokio::select! {
                completion = self.session.next_completion() => Event::Completion(completion),
                line = lines.next_line() => Event::Line(line?),
                _ = next_interrupt(interrupts) => Event::Interrupt,
            };

            let keep_going = match event {
                Event::Completion(Some(completion)) => {
                    if let Applied::Settled(_) = self.session.apply(completion) {
                        self.render()?;
                    }
                    true
                }
                Event::Completion(None) => false,
                Event::Line(Some(line)) => self.handle_input(Input::parse(&line))?,
                Event::Line(None) => {
                    if self.session.state().is_submitting() {
                        tokio::select! {
                            _ = self.session.settle() => {}
                            _ = next_interrupt(interrupts) => {
                                self.session.cancel();
                            }
                        }
                        self.render()?;
                    }
                    false
                }
                Event::Interrupt => {
                    if self.session.cancel() {
                        self.render()?;
                        true
                    } else {
                        false
                    }
                }
            };

            if !keep_going {
                return Ok(());
            }
        }
    }

    /// Returns false when the loop should stop
    fn handle_input(&mut self, input: Input) -> Result<bool> {
        match input {
            Input::Prompt(text) => match self.session.submit(text) {
                SubmitOutcome::Started(_) => self.render()?,
                SubmitOutcome::Ignored => {
                    writeln!(self.out, "{}", "A request is already in progress.".dimmed())?;
                }
                SubmitOutcome::Rejected(error) => {
                    writeln!(self.out, "{}", render_error(&error.display()))?;
                }
            },
            Input::Reset => {
                self.session.reset();
                self.render()?;
            }
            Input::Cancel => {
                if self.session.cancel() {
                    self.render()?;
                } else {
                    writeln!(self.out, "{}", "Nothing to cancel.".dimmed())?;
                }
            }
            Input::Help => writeln!(self.out, "{}", HELP_TEXT)?,
            Input::Quit => return Ok(false),
            Input::Unknown(command) => {
                writeln!(self.out, "Unknown command ':{}'. Type :help for commands.", command)?;
            }
        }
        self.out.flush()?;
        Ok(true)
    }

    fn banner(&mut self) -> Result<()> {
        let descriptor = self.session.descriptor();
        let mut title = format!("{} ({})", descriptor.display_name, descriptor.slug);
        if descriptor.is_new {
            title.push_str(" [new]");
        }
        writeln!(self.out, "{}", title.as_str().bold())?;
        if !descriptor.description.is_empty() {
            writeln!(self.out, "{}", descriptor.description)?;
        }
        writeln!(self.out, "{}", "Type :help for commands.".dimmed())?;
        writeln!(self.out)?;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let text = self.mount.render(self.session.state());
        writeln!(self.out, "{}", text)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
