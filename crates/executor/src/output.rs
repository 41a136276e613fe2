//! Command results and output sinks.
//!
//! A command reports exactly one [`CommandResult`]: a success flag plus an
//! info sentence. Payload (query items, listings) goes to an [`OutputSink`]
//! one item at a time while the command runs.

use std::io;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use arbor_core::Interrupt;

use crate::{Error, Result};

/// Outcome of one command invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Whether the command succeeded
    pub success: bool,
    /// Human-readable sentence, present on success and failure
    pub info: String,
}

impl CommandResult {
    /// Successful result
    pub fn ok(info: impl Into<String>) -> Self {
        Self {
            success: true,
            info: info.into(),
        }
    }

    /// Failed result
    pub fn failed(info: impl Into<String>) -> Self {
        Self {
            success: false,
            info: info.into(),
        }
    }
}

impl From<Result<String>> for CommandResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(info) => CommandResult::ok(info),
            Err(e) => CommandResult::failed(e.to_string()),
        }
    }
}

/// Destination for serialized result items
pub trait OutputSink: Send {
    /// Write one serialized item
    fn write(&mut self, item: &str) -> io::Result<()>;

    /// Write one item on behalf of a running command.
    ///
    /// Sinks whose `write` can block override this and give up with
    /// `Interrupted` once `interrupt` is raised, checking it every `poll`.
    fn write_interruptible(
        &mut self,
        item: &str,
        _interrupt: &Interrupt,
        _poll: Duration,
    ) -> Result<()> {
        self.write(item).map_err(|e| Error::io(&e))
    }
}

/// The sink a running command writes through.
///
/// Every write checks the session interrupt first, so a terminated command
/// stops producing output and cannot stall on a consumer that stopped reading.
pub(crate) struct Output<'a> {
    sink: &'a mut dyn OutputSink,
    interrupt: Interrupt,
    poll: Duration,
}

impl<'a> Output<'a> {
    pub(crate) fn new(sink: &'a mut dyn OutputSink, interrupt: Interrupt, poll: Duration) -> Self {
        Self {
            sink,
            interrupt,
            poll,
        }
    }

    pub(crate) fn write(&mut self, item: &str) -> Result<()> {
        self.interrupt.check()?;
        self.sink.write_interruptible(item, &self.interrupt, self.poll)
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write(&mut self, _item: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Collects items in memory
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    items: Vec<String>,
}

impl BufferSink {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Items written so far
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Take the collected items
    pub fn into_items(self) -> Vec<String> {
        self.items
    }
}

impl OutputSink for BufferSink {
    fn write(&mut self, item: &str) -> io::Result<()> {
        self.items.push(item.to_string());
        Ok(())
    }
}

/// Hands items to a consumer thread over a bounded channel.
///
/// `write` blocks while the channel is full and fails with `BrokenPipe` once
/// the receiver is gone. Commands write through `write_interruptible`, which
/// waits for room in `poll` steps and stops when the session is terminated.
#[derive(Debug)]
pub struct ChannelSink {
    tx: SyncSender<String>,
}

impl ChannelSink {
    /// Create a sink and its receiving end. `capacity` bounds the items in flight.
    pub fn new(capacity: usize) -> (Self, Receiver<String>) {
        let (tx, rx) = sync_channel(capacity);
        (Self { tx }, rx)
    }
}

fn receiver_closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "output receiver closed")
}

impl OutputSink for ChannelSink {
    fn write(&mut self, item: &str) -> io::Result<()> {
        self.tx.send(item.to_string()).map_err(|_| receiver_closed())
    }

    fn write_interruptible(&mut self, item: &str, interrupt: &Interrupt, poll: Duration) -> Result<()> {
        let mut pending = item.to_string();
        loop {
            interrupt.check()?;
            match self.tx.try_send(pending) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(back)) => {
                    pending = back;
                    thread::sleep(poll);
                }
                Err(TrySendError::Disconnected(_)) => return Err(Error::io(&receiver_closed())),
            }
        }
    }
}
