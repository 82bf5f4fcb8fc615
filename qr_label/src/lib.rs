pub mod compose;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod qr;
pub mod settings;

pub use error::QrLabelError;
