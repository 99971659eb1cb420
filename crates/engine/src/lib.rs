//! Console orchestration.
//!
//! Ties the pure rules in `tetris-console-core` to the controller bus:
//!
//! - [`coordinator`]: starts, polls and stops the controllers for one game
//! - [`menu`]: the menu state machine that owns configuration and bracket
//! - [`console`]: a menu machine bundled with its collaborators
//! - [`ports`]: display, clock and buzzer seams
//! - [`config`]: `CONSOLE_*` environment configuration
//! - [`journal`]: JSON-lines record of resolved rounds

pub mod config;
pub mod console;
pub mod coordinator;
pub mod journal;
pub mod menu;
pub mod ports;

pub use tetris_console_adapter as adapter;
pub use tetris_console_core as core;
pub use tetris_console_types as types;

pub use config::{ConfigError, ConsoleConfig, LinkConfig};
pub use console::Console;
pub use coordinator::{ControllerFault, CoordinatorSettings, GameSessionCoordinator, SessionEvent};
pub use journal::{JournalError, MatchRecord, ResultJournal};
pub use menu::{Gate, Io, MenuStateMachine, RoundReport};
pub use ports::{Clock, Display, Feedback, ManualClock, Silent, SystemClock};
