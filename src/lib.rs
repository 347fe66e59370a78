mod collector;
pub mod constants;
mod config;
mod entity;
mod error;
mod event;
mod history;
mod interpolation;
mod mirror;
mod processor;
mod timeline;
mod util;
mod world_state;


pub use crate::collector::*;
pub use crate::config::*;
pub use crate::entity::*;
pub use crate::error::*;
pub use crate::event::*;
pub use crate::history::*;
pub use crate::interpolation::*;
pub use crate::mirror::*;
pub use crate::processor::*;
pub use crate::timeline::*;
pub use crate::util::*;
pub use crate::world_state::*;

#[macro_use]
extern crate derive_new;
