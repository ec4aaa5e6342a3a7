//! Script-to-video generation.
//!
//! A user writes (or dictates) a script, picks an avatar, voice, music and
//! format allowed by their plan, and the pipeline turns it into a video in
//! six ordered stages. Stage work is pluggable; the bundled worker simulates
//! it with timers.

pub mod app;
pub mod capture;
pub mod config;
pub mod entitlement;
pub mod job;
pub mod pipeline;
