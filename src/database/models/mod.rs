pub mod btc_price;

pub use btc_price::{BtcPrice, NewBtcPrice};
