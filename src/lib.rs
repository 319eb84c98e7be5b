//! # Spacecraft Behavior Simulator
//!
//! A discrete-time simulator that drives seven spacecraft subsystem models
//! through a scripted, time sorted timeline of event commands.
//!
//! ## Features
//!
//! - **Event timeline**: fixed capacity, index linked list with runtime insertion
//! - **Three phase engine**: init, accelerated time-lapse and one-second realtime
//! - **Subsystem models**: ADCS, C&DH, comms, flight software recorder,
//!   instrument, power and thermal
//! - **Telemetry**: management snapshot every cycle, model snapshot during contact
//! - **Commands**: start/stop simulation, recorder playback, single-field JSON ids
//!
//! ## Quick Start
//!
//! ```rust
//! use scsim::{RecordingBus, SimConfig, SimEngine};
//!
//! let mut engine = SimEngine::new(SimConfig::default(), RecordingBus::new()).unwrap();
//! engine.start_simulation(1).unwrap();
//!
//! // Init cycle processes every init-time event
//! engine.execute();
//! assert!(engine.is_active());
//! ```
//!
//! ## Architecture
//!
//! - [`engine`] - Phase state machine and command surface
//! - [`timeline`] - Event arena, scenario activation and insertion
//! - [`event`] - Event records and parameter decoding
//! - [`subsystems`] - The spacecraft models
//! - [`telemetry`] - Snapshot builders
//! - [`bus`] - Outbound message sink

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod bus;
pub mod command;
pub mod config;
pub mod eid;
pub mod engine;
pub mod error;
pub mod event;
pub mod scenario;
pub mod subsystems;
pub mod telemetry;
pub mod timeline;

pub use bus::{BusMessage, RecordingBus, SoftwareBus};
pub use command::{parse_command, CommandResponse, ResponseStatus, SimCommand};
pub use config::SimConfig;
pub use engine::{Phase, SimEngine};
pub use error::{SimError, SimResult};
pub use event::{EventCmd, EventCmdParam, ParamKind, SubsystemId};
pub use scenario::ScenarioId;
pub use telemetry::{MgmtTlm, ModelTlm};
pub use timeline::Timeline;
