//! Squelch core: real-time radio voice effects.
//!
//! This crate contains the platform-agnostic effects pipeline that turns a
//! plain voice buffer into something that sounds like it came out of an
//! AM/FM/HAVE QUICK radio or an aircraft intercom. Everything here runs
//! synchronously on the audio render thread; collaborators that touch the
//! file system or async runtimes live in `squelch-infra`.

pub mod domain;
