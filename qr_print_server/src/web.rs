use std::env;
use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio::task;
use url::form_urlencoded;

use crate::error::AppError;
use crate::validate;
use qr_label::directory::{CupsDirectory, PrinterDirectory};
use qr_label::dispatch::PrintDispatcher;
use qr_label::qr;
use qr_label::settings::{FileSettingStore, SettingStore};
use qr_label::{compose, QrLabelError};

/// Fixed path of the settings record, relative to the working directory.
const SETTINGS_FILE: &str = "printer_settings.json";

pub struct AppState {
    pub store: Arc<dyn SettingStore>,
    pub directory: Arc<dyn PrinterDirectory>,
    pub dispatcher: PrintDispatcher,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SettingStore>,
        directory: Arc<dyn PrinterDirectory>,
        dispatcher: PrintDispatcher,
    ) -> Self {
        Self {
            store,
            directory,
            dispatcher,
        }
    }

    pub fn from_env() -> Self {
        let store: Arc<dyn SettingStore> = Arc::new(FileSettingStore::new(SETTINGS_FILE));
        let env_default = env::var("PRINTER_NAME").ok();
        let dispatcher = PrintDispatcher::new(store.clone(), env_default);
        Self::new(store, Arc::new(CupsDirectory::new()), dispatcher)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/print", post(print_label))
        .route("/settings", get(settings_page).post(save_settings))
        .with_state(state)
}

#[derive(Deserialize)]
struct FlashParams {
    msg: Option<String>,
}

#[derive(Deserialize)]
struct PrintForm {
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    printer: String,
    #[serde(default)]
    manual_printer: String,
}

async fn index(Query(params): Query<FlashParams>) -> Html<String> {
    debug!("rendering index page");
    Html(render_index(params.msg.as_deref()))
}

async fn print_label(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PrintForm>,
) -> Result<Response, AppError> {
    let url = form.url.trim().to_string();
    let description = form.description.trim().to_string();
    info!("print request received, url={url}");

    if url.is_empty() || description.is_empty() {
        warn!("print request missing url or description");
        return Ok(flash_redirect("Both URL and description are required."));
    }
    if !validate::is_valid_url(&url) {
        warn!("rejected invalid url: {url}");
        return Ok(flash_redirect(
            "Invalid URL provided. Please enter a valid URL starting with http:// or https://",
        ));
    }

    let outcome = task::spawn_blocking(move || -> Result<(), QrLabelError> {
        let image = qr::encode(&url)?;
        let document = compose::compose(&image, &description)?;
        state.dispatcher.dispatch(&document)
    })
    .await?;

    match outcome {
        Ok(()) => {
            info!("print job completed successfully");
            Ok(Html(render_result("Printed successfully!")).into_response())
        }
        Err(err) => {
            error!("print pipeline failed: {err:?}");
            Ok(flash_redirect(&flash_message(&err)))
        }
    }
}

async fn settings_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    debug!("rendering settings page");
    let page = task::spawn_blocking(move || settings_view(&state, None)).await?;
    Ok(Html(page))
}

async fn save_settings(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SettingsForm>,
) -> Result<Html<String>, AppError> {
    let page = task::spawn_blocking(move || settings_view(&state, Some(form))).await?;
    Ok(Html(page))
}

/// Shared GET/POST settings logic: list printers, optionally apply a
/// submitted choice, render the page with the outcome message.
fn settings_view(state: &AppState, submitted: Option<SettingsForm>) -> String {
    let mut message: Option<String> = None;
    let mut printers: Vec<String> = Vec::new();

    match state.directory.list_printers() {
        Ok(found) if found.is_empty() => {
            message = Some("No printers found. Please check your print spooler setup.".into());
        }
        Ok(found) => printers = found,
        Err(err) => {
            error!("printer directory lookup failed: {err:?}");
            message = Some("Printer directory unavailable. Please check your print spooler.".into());
        }
    }

    let mut selected = match state.store.load() {
        Ok(saved) => saved,
        Err(err) => {
            warn!("could not load printer setting: {err:?}");
            None
        }
    }
    .or_else(|| printers.first().cloned());

    if let Some(form) = submitted {
        let manual = form.manual_printer.trim().to_string();
        let chosen = form.printer;

        if !manual.is_empty() {
            // a manually entered name is authoritative, even when the
            // directory lookup failed
            match state.store.save(&manual) {
                Ok(()) => {
                    if !printers.contains(&manual) {
                        printers.push(manual.clone());
                    }
                    message = Some(format!("Manual printer '{manual}' saved as default."));
                    selected = Some(manual);
                }
                Err(err) => {
                    error!("failed to save printer setting: {err:?}");
                    message = Some("Failed to save the printer setting.".into());
                }
            }
        } else if printers.contains(&chosen) {
            match state.store.save(&chosen) {
                Ok(()) => {
                    message = Some(format!("Printer '{chosen}' saved as default."));
                    selected = Some(chosen);
                }
                Err(err) => {
                    error!("failed to save printer setting: {err:?}");
                    message = Some("Failed to save the printer setting.".into());
                }
            }
        } else {
            message = Some("Invalid printer selection.".into());
        }
    }

    render_settings(&printers, selected.as_deref(), message.as_deref())
}

fn flash_message(err: &QrLabelError) -> String {
    match err {
        QrLabelError::Encode(_) => "Failed to generate QR code. Please try again.".into(),
        QrLabelError::Pdf(_) | QrLabelError::InvalidImage => {
            "Failed to generate the document. Please try again.".into()
        }
        QrLabelError::Print { stderr } => {
            format!("Failed to send the document to the printer: {stderr}")
        }
        QrLabelError::Io(_) => {
            "Failed to send the document to the printer. Please try again.".into()
        }
        QrLabelError::SettingStore(_) => "Could not read the saved printer settings.".into(),
        QrLabelError::Directory(_) => {
            "Printer directory unavailable. Please check your print spooler.".into()
        }
    }
}

fn flash_redirect(msg: &str) -> Response {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("msg", msg)
        .finish();
    Redirect::to(&format!("/?{query}")).into_response()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\
<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
<body>{body}</body></html>"
    )
}

fn render_index(flash: Option<&str>) -> String {
    let flash_html = flash
        .map(|msg| format!("<p class=\"flash\">{}</p>", escape_html(msg)))
        .unwrap_or_default();
    page(
        "Print a QR label",
        &format!(
            "{flash_html}\
<h1>Print a QR label</h1>\
<form action=\"/print\" method=\"post\">\
<p><label>URL <input type=\"text\" name=\"url\" size=\"60\"></label></p>\
<p><label>Description <input type=\"text\" name=\"description\" size=\"60\"></label></p>\
<p><button type=\"submit\">Print</button></p>\
</form>\
<p><a href=\"/settings\">Printer settings</a></p>"
        ),
    )
}

fn render_result(status: &str) -> String {
    page(
        "Print result",
        &format!(
            "<h1>{}</h1><p><a href=\"/\">Print another label</a></p>",
            escape_html(status)
        ),
    )
}

fn render_settings(printers: &[String], selected: Option<&str>, message: Option<&str>) -> String {
    let message_html = message
        .map(|msg| format!("<p class=\"flash\">{}</p>", escape_html(msg)))
        .unwrap_or_default();

    let mut options = String::new();
    for printer in printers {
        let checked = if selected == Some(printer.as_str()) {
            " checked"
        } else {
            ""
        };
        let name = escape_html(printer);
        options.push_str(&format!(
            "<p><label><input type=\"radio\" name=\"printer\" value=\"{name}\"{checked}> {name}</label></p>"
        ));
    }

    page(
        "Printer settings",
        &format!(
            "{message_html}\
<h1>Printer settings</h1>\
<form action=\"/settings\" method=\"post\">\
{options}\
<p><label>Manual printer <input type=\"text\" name=\"manual_printer\" size=\"40\"></label></p>\
<p><button type=\"submit\">Save</button></p>\
</form>\
<p><a href=\"/\">Back to the form</a></p>"
        ),
    )
}
