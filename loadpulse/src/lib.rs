//! LoadPulse: a virtual-user load-generation engine.
//!
//! A run simulates `virtual_users` concurrent clients, each executing a
//! loop of timed requests (SQL queries or HTTP calls) against a target.
//! Workers are launched over a ramp-up window, every iteration produces
//! one [`Outcome`](loadpulse_core::Outcome), and all outcomes are
//! multiplexed onto a single live result stream that closes once every
//! worker has finished.
//!
//! # Example
//!
//! ```no_run
//! use loadpulse::{LoadTest, RunEvent};
//! use loadpulse_core::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RunConfig {
//!         virtual_users: 3,
//!         termination: TerminationPolicy::Iterations(2),
//!         ramp_up: Duration::ZERO,
//!         target: TargetParams::Http(HttpTarget {
//!             url: "http://localhost:3000/data".to_string(),
//!             method: HttpMethod::Get,
//!             body: None,
//!         }),
//!     };
//!
//!     let mut handle = LoadTest::new(config).unwrap().stream();
//!     while let Some(event) = handle.recv().await {
//!         match event {
//!             RunEvent::Outcome(outcome) => println!("{outcome:?}"),
//!             RunEvent::Closed(result) => {
//!                 println!("run finished: {result:?}");
//!                 break;
//!             }
//!         }
//!     }
//! }
//! ```

pub mod executor;

pub(crate) mod builder;
pub(crate) mod scheduler;
pub(crate) mod session;
pub(crate) mod worker;

pub use executor::{HttpExecutor, IterationContext, RequestExecutor, SqlExecutor};
pub use session::{LoadTest, RunError, RunEvent, RunHandle};
