// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod dashboard;
pub mod input;
pub mod render;
pub mod sampler;
pub mod snapshot;
pub mod terminal;
