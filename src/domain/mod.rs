pub mod assembly;
pub mod image_record;
pub mod image_sequence;
pub mod input_source;
pub mod orientation;
pub mod page_layout;
pub mod pdf_file;
pub mod settings;

// --- public re-exports ---
pub use assembly::{
    AssembledDocument, Assembler, AssemblyError, AssemblyState, CancelFlag, Progress,
};
pub use image_record::{AdmittedImage, EncodedImage, ImageFormatTag, ImageId, ImageRecord};
pub use image_sequence::{ImageSequence, SequenceError};
pub use orientation::{choose_page_orientation, OrientationMode, PageOrientation};
pub use page_layout::{
    layout_image_on_page, page_geometry, PageGeometry, PageSize, PaperSize, Rect, MARGIN_PT,
};
pub use settings::{ConversionSettings, Quality};
