//! Test doubles shared by the unit, behaviour and session suites.

mod authority;
mod config_loader;
mod device;
mod harness;
mod memory;
mod reporter;

pub use authority::{RecordingSink, ScriptedAuthority};
pub use config_loader::{FailingConfigLoader, TestConfigLoader, TestHost};
pub use device::FakeDevice;
pub use harness::DispatchHarness;
pub use memory::{MemoryConnector, MemoryPeer, memory_link};
pub use reporter::{HealthEvent, RecordingHealthReporter};
