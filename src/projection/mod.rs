//! Cash-flow projection and IRR for a single loan

pub mod rounding;
mod amortization;
mod schedule;
mod cashflows;
mod engine;
mod irr;

pub use amortization::LevelPayment;
pub use schedule::ScheduleBuilder;
pub use cashflows::{CashFlowSchedule, Period, ScheduleSummary};
pub use engine::{WaterfallEngine, EARNOUT_MONTHS};
pub use irr::{Annualization, IrrResult, IrrSettings, IrrSolver, npv_at_rate};
pub use rounding::{bank_round, floor_round, round_to};
