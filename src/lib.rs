//! Chroma - pick a color, send it as CMYKW
//!
//! Configuration, the device adapter and its transports, color history
//! and the picker's color controller. Color math lives in `chroma-color`.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod services;
