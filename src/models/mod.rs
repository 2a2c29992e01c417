pub mod horizon;
pub mod order;

pub use horizon::Horizon;
pub use order::{ingest_rows, IngestReport, OrderLine, RawOrderLine, RowError};
