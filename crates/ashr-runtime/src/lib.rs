//! ashr-runtime
//!
//! Stateful services around the pure calendar crate:
//!
//! - [`clock`]: the `Clock` seam (system clock; manual/paused clocks under
//!   the `testkit` feature).
//! - [`store`]: calendar/quote store traits, the Postgres store and the
//!   "not configured" store.
//! - [`calendar`]: store-backed calendar completion with graceful
//!   degradation.
//! - [`resolver`]: latest-trading-date resolver with its TTL cache.
//! - [`timer`]: adaptive market timer.

pub mod calendar;
pub mod clock;
pub mod resolver;
pub mod store;
pub mod timer;

pub use calendar::CalendarService;
pub use clock::{Clock, SystemClock};
pub use resolver::{LatestTradingDateResolver, TradingDateCache, TradingDateInfo};
pub use store::{CalendarStore, PgStore, QuoteStore, UnavailableStore};
pub use timer::{MarketTimer, TickFn, TradingDayProbe};
