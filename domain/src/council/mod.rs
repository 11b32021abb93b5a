//! Grading council domain
//!
//! The pure parts of the council protocol.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Round 1: independent grading (all models, concurrently)    │
//! │                          ↓                                   │
//! │  agreement(round-1 results) >= threshold ?                   │
//! │        yes ─► aggregate(round 1)                             │
//! │        no  ─► Round 2: deliberation (all models see round 1) │
//! │                          ↓                                   │
//! │               aggregate(round 2, or round 1 if none)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod aggregation;
pub mod agreement;
pub mod parsing;
pub mod state;

pub use aggregation::{Aggregation, aggregate};
pub use agreement::agreement;
pub use parsing::{ParseError, ParsedGrade, parse_grade_response};
pub use state::CouncilState;
