pub mod config;
pub mod idea;
pub mod literature;
pub mod provider;
pub mod review;
pub mod run;

pub use config::*;
pub use idea::*;
pub use literature::*;
pub use provider::*;
pub use review::*;
pub use run::*;
