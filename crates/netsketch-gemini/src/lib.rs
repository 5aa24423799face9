//! Netsketch Gemini - image-model backend
//!
//! Implements [`netsketch_core::ImageGenerator`] over the Gemini
//! `generateContent` REST call: input images go out as inline parts followed
//! by the prompt, and the first inline image part of the first candidate is
//! the result.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod error;
pub mod wire;

pub use client::GeminiClient;
pub use error::GeminiError;
