use std::sync::Arc;

use clap::Parser;
use qr_label::dispatch::PrintDispatcher;
use qr_label::settings::FileSettingStore;
use qr_label::{compose, qr, QrLabelError};

/// Print a QR label for a URL without going through the web form
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// URL to encode in the QR code
    url: String,

    /// Description printed below the QR code
    description: String,

    /// Printer to use, bypassing the saved setting
    #[arg(short, long)]
    printer: Option<String>,
}

fn main() -> Result<(), QrLabelError> {
    env_logger::init();

    let args = Args::parse();

    let store = Arc::new(FileSettingStore::new("printer_settings.json"));
    let dispatcher = PrintDispatcher::new(store, std::env::var("PRINTER_NAME").ok());

    let image = qr::encode(&args.url)?;
    let document = compose::compose(&image, &args.description)?;

    match args.printer {
        Some(printer) => dispatcher.dispatch_to(&printer, &document),
        None => dispatcher.dispatch(&document),
    }
}
