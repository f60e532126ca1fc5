//! Runtime for driving the Prover9 and Mace4 programs.
//!
//! The option model lives in [`pmopt`]; this crate adds the session
//! configuration, the assembly of program input, and the controller of the
//! external processes with their result extraction. Most consumers will build
//! a [`launcher::Launcher`] from a [`base::meta::SessionConfig`] and start
//! [`job::Job`]s with input produced by an [`input::InputAssembler`]. Models can
//! be filtered with [`isofilter`] and input checked with [`syntax`].

pub mod base;
pub mod extractor;
pub mod input;
pub mod isofilter;
pub mod job;
pub mod launcher;
pub mod locator;
pub mod magic;
pub mod program;
pub mod stats;
pub mod syntax;
pub mod utils;

pub extern crate pmopt;
