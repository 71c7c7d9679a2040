pub(crate) mod command;
pub(crate) mod disk;
pub(crate) mod os;
pub mod reachability;
pub(crate) mod service;

pub mod collector;
pub mod facility;
pub mod probe;
pub mod target;

pub use collector::{collect_host_results, CollectionPlan};
pub use probe::{HostProbe, ProbeSettings, SystemProbe};
