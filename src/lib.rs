//! Lightweight in-process actor runtime.
//!
//! `hypha` multiplexes many independently-addressable stateful actors onto
//! the tokio worker pool. Each actor owns a three-partition mailbox
//! (priority / regular / stash) drained by exactly one execution loop, so
//! message handling is serial per actor and parallel across actors.
//!
//! # Architecture
//!
//! ```text
//!  sender ──send()──────────▶ ┌───────────────────────────────┐
//!  sender ──send_priority()─▶ │  ActorSystem                  │
//!                             │   registry: Pid → mailbox     │
//!                             └──────────────┬────────────────┘
//!                                            │ enqueue
//!                             ┌──────────────▼────────────────┐
//!                             │  Mailbox                      │
//!                             │   priority │ regular │ stash  │
//!                             └──────────────┬────────────────┘
//!                                            │ dequeue (single consumer)
//!                             ┌──────────────▼────────────────┐
//!                             │  execution loop (tokio task)  │
//!                             │   state.receive(msg) → next   │
//!                             └───────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use hypha::{Actor, ActorSystem, Transition};
//! use async_trait::async_trait;
//!
//! enum Msg {
//!     Greet(&'static str),
//!     Stop,
//! }
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl Actor<Msg> for Greeter {
//!     async fn receive(self: Box<Self>, msg: Msg) -> Transition<Msg> {
//!         match msg {
//!             Msg::Greet(name) => {
//!                 println!("hello, {name}");
//!                 Transition::resume(self)
//!             }
//!             Msg::Stop => Transition::terminate(self),
//!         }
//!     }
//! }
//!
//! # #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
//! # async fn main() {
//! let system = ActorSystem::new();
//! let pid = system
//!     .spawn(|_system, _pid| (Box::new(Greeter) as Box<dyn Actor<Msg>>, 0))
//!     .await;
//! system.send(pid, Msg::Greet("world")).await.unwrap();
//! system.send(pid, Msg::Stop).await.unwrap();
//! system.await_termination().await;
//! # }
//! ```
//!
//! # Delivery contract
//!
//! - Per-sender FIFO within each of the regular and priority tiers; a
//!   priority message is delivered before every regular message queued at
//!   the moment it was sent.
//! - Senders never block: a full mailbox is an error, not backpressure.
//! - Termination discards whatever is still queued in the terminating
//!   actor's mailbox; a `send` that succeeded moments earlier is not
//!   retroactively failed. See [`ActorSystem::send`].

pub mod actor;
pub mod error;
pub mod mailbox;
pub mod system;

mod queue;

pub use actor::{Actor, Control, Pid, Transition};
pub use error::SendError;
pub use mailbox::Mailbox;
pub use system::ActorSystem;
