// src/lib.rs
//! Desktop simulator for an embedded HMI.
//!
//! The embedded UI engine and application run unchanged against simulated
//! drivers: engine display writes land in a frame buffer, which is uploaded
//! into a ring of three GPU textures and presented full-screen on the host's
//! refresh cadence.

pub mod clock;
pub mod color;
pub mod config;
pub mod controls;
pub mod demo;
pub mod display;
pub mod engine;
pub mod framebuffer;
pub mod gpu;
pub mod host;
pub mod input;
pub mod orchestrator;
