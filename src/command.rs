//! Deferred module configuration
//!
//! Configuration changes can come from contexts that do not own the engine
//! (interrupt handlers, a serial parser, another task). They are queued as
//! [`ModuleCommand`]s in a [`CommandChannel`] and applied by the engine owner
//! between updates.
//!
//! The channel is guarded by `critical-section`, so any number of senders
//! can share it with the receiver.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Duration;
use heapless::Deque;

use crate::pattern::ModuleConfig;

/// Setter call addressed to one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleCommand {
    /// Replace the whole module configuration.
    SetPattern { index: usize, config: ModuleConfig },
    /// Replace only the brightness.
    SetBrightness { index: usize, brightness: u8 },
    /// Replace only the period.
    SetPeriod { index: usize, period: Duration },
    /// Replace only the reserved parameter.
    SetParam { index: usize, param: u8 },
}

impl ModuleCommand {
    /// Index of the addressed module.
    pub const fn index(&self) -> usize {
        match *self {
            Self::SetPattern { index, .. }
            | Self::SetBrightness { index, .. }
            | Self::SetPeriod { index, .. }
            | Self::SetParam { index, .. } => index,
        }
    }
}

/// Returned when the channel is full, carries the rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError<T>(pub T);

/// Returned when the channel is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryReceiveError;

/// Bounded queue of module commands.
pub struct CommandChannel<const SIZE: usize> {
    queue: Mutex<RefCell<Deque<ModuleCommand, SIZE>>>,
}

impl<const SIZE: usize> CommandChannel<SIZE> {
    /// Create a new empty channel.
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a sender handle for this channel.
    ///
    /// Multiple senders can coexist; they share the same queue.
    pub const fn sender(&self) -> CommandSender<'_, SIZE> {
        CommandSender { channel: self }
    }

    /// Get a receiver handle for this channel.
    pub const fn receiver(&self) -> CommandReceiver<'_, SIZE> {
        CommandReceiver { channel: self }
    }

    /// Queue a command.
    ///
    /// Returns the command back if the queue is full.
    pub fn try_send(&self, command: ModuleCommand) -> Result<(), TrySendError<ModuleCommand>> {
        critical_section::with(|cs| {
            self.queue
                .borrow(cs)
                .borrow_mut()
                .push_back(command)
                .map_err(TrySendError)
        })
    }

    /// Take the oldest queued command.
    pub fn try_receive(&self) -> Result<ModuleCommand, TryReceiveError> {
        critical_section::with(|cs| {
            self.queue
                .borrow(cs)
                .borrow_mut()
                .pop_front()
                .ok_or(TryReceiveError)
        })
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow(cs).borrow().len())
    }

    /// Check if no command is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for CommandChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half of a [`CommandChannel`].
///
/// Mirrors the engine setters, so callers holding only a sender configure
/// modules the same way the engine owner does.
#[derive(Clone, Copy)]
pub struct CommandSender<'a, const SIZE: usize> {
    channel: &'a CommandChannel<SIZE>,
}

impl<const SIZE: usize> CommandSender<'_, SIZE> {
    /// Queue a command.
    ///
    /// Returns `Err(TrySendError(command))` if the channel is full.
    pub fn try_send(&self, command: ModuleCommand) -> Result<(), TrySendError<ModuleCommand>> {
        let result = self.channel.try_send(command);
        #[cfg(feature = "esp32-log")]
        if result.is_err() {
            esp_println::println!(
                "[CommandSender.try_send] queue full, dropping {:?}",
                command
            );
        }
        result
    }

    /// Queue a full module configuration.
    pub fn set_pattern(
        &self,
        index: usize,
        config: ModuleConfig,
    ) -> Result<(), TrySendError<ModuleCommand>> {
        self.try_send(ModuleCommand::SetPattern { index, config })
    }

    /// Queue a brightness change.
    pub fn set_brightness(
        &self,
        index: usize,
        brightness: u8,
    ) -> Result<(), TrySendError<ModuleCommand>> {
        self.try_send(ModuleCommand::SetBrightness { index, brightness })
    }

    /// Queue a period change.
    pub fn set_period(
        &self,
        index: usize,
        period: Duration,
    ) -> Result<(), TrySendError<ModuleCommand>> {
        self.try_send(ModuleCommand::SetPeriod { index, period })
    }

    /// Queue a reserved parameter change.
    pub fn set_param(&self, index: usize, param: u8) -> Result<(), TrySendError<ModuleCommand>> {
        self.try_send(ModuleCommand::SetParam { index, param })
    }
}

/// Receiving half of a [`CommandChannel`].
#[derive(Clone, Copy)]
pub struct CommandReceiver<'a, const SIZE: usize> {
    channel: &'a CommandChannel<SIZE>,
}

impl<const SIZE: usize> CommandReceiver<'_, SIZE> {
    /// Take the oldest queued command.
    ///
    /// Returns `Err(TryReceiveError)` if the channel is empty.
    pub fn try_receive(&self) -> Result<ModuleCommand, TryReceiveError> {
        self.channel.try_receive()
    }
}
