pub mod action_dispatcher;
pub mod decision_parser;
pub mod observation_collector;
pub mod stability_evolver;

pub use action_dispatcher::{ActionDispatcher, DispatchOutcome, TradeDefaults};
pub use decision_parser::{extract_json_objects, parse_decision};
pub use observation_collector::{ObservationCollector, SyntheticBalance};
pub use stability_evolver::StabilityEvolver;
