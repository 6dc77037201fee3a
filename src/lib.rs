//! Procedural volumetric nebulae: fractal noise density fields rendered by
//! raymarching.

#[macro_use]
mod macros;

pub mod config;
pub mod field;
pub mod geometry;
pub mod noise;
pub mod num;
pub mod raymarch;
pub mod rendering;
pub mod run;
pub mod shape;
pub mod volume;
