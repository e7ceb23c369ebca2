use crate::error::RenderError;
use axum::http::{StatusCode, request::Parts};
use std::io::Write;

/// Writes a human-readable error page for a failed request
pub trait ErrorPageRenderer: Send + Sync + 'static {
    fn render_error_page(
        &self,
        request: &Parts,
        writer: &mut dyn Write,
        status: StatusCode,
        message: &str,
        show_details: bool,
    ) -> Result<(), RenderError>;
}

/// Minimal HTML error page without any server branding
#[derive(Debug, Clone, Copy, Default)]
pub struct UnbrandedErrorPage;

impl ErrorPageRenderer for UnbrandedErrorPage {
    fn render_error_page(
        &self,
        request: &Parts,
        writer: &mut dyn Write,
        status: StatusCode,
        message: &str,
        show_details: bool,
    ) -> Result<(), RenderError> {
        let code = status.as_u16();
        let message = escape_html(message);

        writeln!(writer, "<html>")?;
        writeln!(writer, "<head>")?;
        writeln!(
            writer,
            "<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\"/>"
        )?;
        writeln!(writer, "<title>Error {} {}</title>", code, message)?;
        writeln!(writer, "</head>")?;
        writeln!(writer, "<body>")?;
        writeln!(writer, "<h2>HTTP ERROR {}</h2>", code)?;
        if show_details {
            writeln!(
                writer,
                "<p>Problem accessing {}.</p>",
                escape_html(request.uri.path())
            )?;
        }
        writeln!(writer, "<pre>{}</pre>", message)?;
        writeln!(writer, "</body>")?;
        writeln!(writer, "</html>")?;
        writer.flush()?;
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
