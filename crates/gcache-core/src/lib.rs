pub mod checksum;
pub mod config;
pub mod differ;
pub mod extract;
pub mod layout;
pub mod ledger;
pub mod logging;
pub mod manifest;
pub mod plan;
pub mod transport;
pub mod update;
