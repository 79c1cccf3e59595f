pub mod control_loop;
pub mod supervisor;

pub use control_loop::ControlLoop;
pub use supervisor::{build_collector, build_control_loop, Supervisor, SupervisorHandle};
