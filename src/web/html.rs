use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbImage};
use pulldown_cmark::{Options, Parser};
use std::fmt::Write;
use std::io::Cursor;

use super::AboutDoc;
use super::form::*;
use crate::models::{LabelPosition, StyleOptions};
use crate::pipeline::{BatchReport, ImageOutcome, ImageReport};

const TITLE: &str = "Traffic sign detection (YOLO, 640)";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; }
aside { width: 260px; padding: 1rem; background: #f0f2f6; min-height: 100vh; }
main { flex: 1; padding: 1rem 2rem; max-width: 1100px; }
label { display: block; margin-top: .8rem; }
.warning { background: #fffbe6; border-left: 4px solid #f0ad4e; padding: .5rem 1rem; margin: .5rem 0; }
.error { background: #fdecea; border-left: 4px solid #d9534f; padding: .5rem 1rem; margin: .5rem 0; }
.pair { display: flex; gap: 1rem; }
.pair figure { flex: 1; margin: 0; }
.pair img { width: 100%; }
hr { margin: 2rem 0; }
"#;

pub fn escape(text: &str) -> String {
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

/// PNG data URI for an inline <img>
pub fn png_data_uri(image: &RgbImage) -> Result<String> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&buf)))
}

fn position_label(position: LabelPosition) -> &'static str {
    match position {
        LabelPosition::Above => "Above",
        LabelPosition::Below => "Below",
        LabelPosition::Left => "Left",
        LabelPosition::Right => "Right",
        LabelPosition::Inside => "Inside",
    }
}

fn settings_panel(out: &mut String, style: &StyleOptions) {
    let (t_lo, t_hi) = StyleOptions::THRESHOLD_RANGE;
    let (b_lo, b_hi) = StyleOptions::THICKNESS_RANGE;
    let (f_lo, f_hi) = StyleOptions::FONT_SIZE_RANGE;

    out.push_str("<aside><h3>Display settings</h3>");
    let _ = write!(
        out,
        r#"<label>Confidence threshold
<input form="upload" type="number" name="{FIELD_CONFIDENCE}" min="{t_lo}" max="{t_hi}" step="0.01" value="{:.2}"></label>"#,
        style.confidence_threshold
    );
    let _ = write!(
        out,
        r#"<label><input form="upload" type="checkbox" name="{FIELD_SHOW_CONFIDENCE}"{}> Show confidence</label>"#,
        if style.show_confidence { " checked" } else { "" }
    );
    out.push_str("<fieldset><legend>Label position</legend>");
    for position in LabelPosition::ALL {
        let _ = write!(
            out,
            r#"<label><input form="upload" type="radio" name="{FIELD_LABEL_POSITION}" value="{}"{}> {}</label>"#,
            position.as_str(),
            if position == style.label_position { " checked" } else { "" },
            position_label(position)
        );
    }
    out.push_str("</fieldset>");
    let _ = write!(
        out,
        r#"<label>Box thickness
<input form="upload" type="range" name="{FIELD_BOX_THICKNESS}" min="{b_lo}" max="{b_hi}" value="{}"></label>"#,
        style.box_thickness
    );
    let _ = write!(
        out,
        r#"<label>Font size
<input form="upload" type="range" name="{FIELD_FONT_SIZE}" min="{f_lo}" max="{f_hi}" value="{}"></label>"#,
        style.font_size
    );
    out.push_str("</aside>");
}

/// Render markdown, passing embedded HTML through unchanged
pub fn markdown_to_html(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut html = String::with_capacity(text.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, Parser::new_ext(text, options));
    html
}

fn about_block(out: &mut String, about: &AboutDoc) {
    match about {
        AboutDoc::Present(text) => {
            out.push_str("<details><summary>About this app (README)</summary>");
            out.push_str(&markdown_to_html(text));
            out.push_str("</details>");
        }
        AboutDoc::Missing(reason) => {
            let _ = write!(out, r#"<div class="warning">{}</div>"#, escape(reason));
        }
    }
}

fn upload_form(out: &mut String, max_files: usize) {
    let _ = write!(
        out,
        r#"<form id="upload" action="/detect" method="post" enctype="multipart/form-data">
<label>Choose up to {max_files} images...
<input type="file" name="{FIELD_IMAGES}" accept=".jpg,.jpeg,.png,image/jpeg,image/png" multiple></label>
<p><button type="submit">Detect</button></p>
</form>"#
    );
}

fn page(style: &StyleOptions, about: &AboutDoc, max_files: usize, body: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{TITLE}</title><style>{STYLE}</style></head><body>"
    );
    settings_panel(&mut out, style);
    let _ = write!(out, "<main><h1>{TITLE}</h1>");
    about_block(&mut out, about);
    upload_form(&mut out, max_files);
    out.push_str(body);
    out.push_str("</main></body></html>");
    out
}

/// Upload form with default settings and an optional notice
pub fn render_index(style: &StyleOptions, about: &AboutDoc, max_files: usize, notice: Option<&str>) -> String {
    let body = notice
        .map(|n| format!(r#"<div class="warning">{}</div>"#, escape(n)))
        .unwrap_or_default();
    page(style, about, max_files, &body)
}

fn image_section(out: &mut String, report: &ImageReport) -> Result<()> {
    let i = report.index;
    let _ = write!(out, "<hr><h2>Image {}/{}</h2>", i, report.total);

    match &report.outcome {
        ImageOutcome::Failed(err) => {
            let _ = write!(
                out,
                r#"<div class="error">{}: {}</div>"#,
                escape(&report.file_name),
                escape(err)
            );
        }
        ImageOutcome::Annotated { original, result } => {
            let _ = write!(
                out,
                r#"<div class="pair"><figure><img src="{}" alt="original"><figcaption>Original image {i}</figcaption></figure><figure><img src="{}" alt="result"><figcaption>Detection result {i}</figcaption></figure></div>"#,
                png_data_uri(original)?,
                png_data_uri(&result.image)?
            );

            if let Some(warning) = report.warning() {
                let _ = write!(out, r#"<div class="warning">{}</div>"#, escape(&warning));
            } else {
                let _ = write!(out, "<h3>Detected road signs (image {i}):</h3><ul>");
                for label in &result.labels {
                    let _ = write!(
                        out,
                        "<li>{} (confidence: {:.2})</li>",
                        escape(&label.label),
                        label.confidence
                    );
                }
                out.push_str("</ul>");
            }
        }
    }
    Ok(())
}

/// Results page: batch warning then one section per image
pub fn render_results(report: &BatchReport, style: &StyleOptions, about: &AboutDoc, max_files: usize) -> Result<String> {
    let mut body = String::new();
    if let Some(warning) = &report.warning {
        let _ = write!(body, r#"<div class="warning">{}</div>"#, escape(warning));
    }
    for image in &report.images {
        image_section(&mut body, image)?;
    }
    Ok(page(style, about, max_files, &body))
}
