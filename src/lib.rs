//! Generate QR codes with an optional caption drawn underneath.
//!
//! The pipeline is `GenerationRequest` → [`qr::encode`] → [`compose::compose`],
//! driven either by the command line ([`cli`]) or the window ([`gui`]).

pub mod args;
pub mod cli;
pub mod color;
pub mod compose;
pub mod error;
pub mod font;
pub mod gui;
pub mod logging;
pub mod pipeline;
pub mod preview;
pub mod qr;

pub use error::{GenerateError, SaveError, Warning};
pub use pipeline::{generate, save, GenerationRequest, Generated};
