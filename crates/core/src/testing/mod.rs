//! Test doubles shared by unit and integration tests.

mod mock_relay;

pub use mock_relay::{MockRelay, MockRelayProcess};
