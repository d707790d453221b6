pub mod abi;
pub mod address;
pub mod contracts;

pub use address::{Address, TxHash};
pub use contracts::{StakedEvent, UserPosition};
