//! Configuration types and loading for content mapping synchronization.
//!
//! Configuration is read from layered files under `configuration/` and can be overridden
//! through `APP_`-prefixed environment variables, see [`load::load_synchronizer_config`].

pub mod environment;
pub mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{LoadConfigError, load_synchronizer_config, load_synchronizer_config_for};
