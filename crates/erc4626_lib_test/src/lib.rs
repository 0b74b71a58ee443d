mod accounts;
mod mock_client;

pub use accounts::{eth, test_actor, test_asset, test_vault};
pub use mock_client::{CallKind, MockContractClient, RecordedCall};
