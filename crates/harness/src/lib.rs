pub mod api;
pub mod console;
pub mod harness;
pub mod render;
pub mod suite;

pub use api::ExchangeApi;
pub use console::{Captured, Console};
pub use harness::{ExchangeTestHarness, Pacing};
pub use suite::{Step, SuiteReport};
