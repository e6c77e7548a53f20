//! Built-in pipeline element implementations.

pub mod aggregate;
pub mod dump;
pub mod evaluation;
pub mod files;
pub mod print;
pub mod producer;
pub mod reshape;
pub mod statistics;
pub mod transport;

pub use aggregate::{Aggregate, AggregatingReceive, Column, Condense, CondensingReceive, Field, Row};
pub use dump::Dump;
pub use evaluation::Evaluation;
pub use files::{Read, Save};
pub use print::Print;
pub use producer::Producer;
pub use reshape::{Decorate, Enumerate, MapEach, Unpack};
pub use statistics::{Mean, RuntimeStatistics, StandardDeviation, Sum};
pub use transport::{ReceiveResults, SendResults};
