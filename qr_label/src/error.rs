use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrLabelError {
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("qr encoding error")]
    Encode(#[from] qrcode::types::QrError),
    #[error("pdf error")]
    Pdf(#[from] printpdf::Error),
    #[error("invalid image")]
    InvalidImage,
    #[error("print command failed: {stderr}")]
    Print { stderr: String },
    #[error("settings store error: {0}")]
    SettingStore(String),
    #[error("printer directory error: {0}")]
    Directory(String),
}
