pub mod create_pdf;
pub mod delivery;
pub mod sink;

pub use create_pdf::{LopdfSink, PdfBuilder};
pub use delivery::{generate_file_name, Delivery, DirectoryDelivery};
pub use sink::{DocumentSink, SinkError};
