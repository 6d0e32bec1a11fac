//! Subscriber API: the [`Subscribe`] trait, the fan-out [`SubscriberSet`],
//! and the built-in [`TraceWriter`].

mod log;
mod set;
mod subscribe;

pub use log::TraceWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
