mod codec;
mod interface;
mod layout;

pub use codec::*;
pub use interface::*;
pub use layout::*;
