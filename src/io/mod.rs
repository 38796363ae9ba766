pub mod drain;
pub mod encoding;
pub mod options;
pub mod sink;
pub mod source;
pub mod tee;

pub use drain::*;
pub use encoding::*;
pub use options::*;
pub use sink::*;
pub use source::*;
pub use tee::*;
