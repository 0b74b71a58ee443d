pub mod balances;
pub mod console;
pub mod vault_action;
