//! vizaskctl library
//!
//! Drives request cycles against a dashboard host and an analytics backend.
//! The binary in `main.rs` is a thin shell over these modules.

pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod errors;
pub mod gateway;
pub mod input;
pub mod logging;
pub mod surface;

pub use controller::{Command, Controller, ControllerSettings, CycleError, CycleReport, Phase};
pub use gateway::{Backend, BackendResponse, FakeBackend, GatewayError, HttpBackend};
pub use surface::{Pane, RecordingSurface, SurfaceEvent, TerminalSurface, UiSurface};
