//! Plain-text rendering of the current projection.

use shoplist_core::{Item, Outcome, RenderRequest, SessionListener, ViewControls};
use std::io::{self, Write};

const SHORT_ID_CHARS: usize = 8;

/// Listener that redraws the list on stdout after each command.
pub struct TerminalRenderer;

impl SessionListener for TerminalRenderer {
    fn on_render(&mut self, request: &RenderRequest<'_>) {
        let mut out = io::stdout().lock();
        let result = render_request(&mut out, request).and_then(|()| out.flush());
        if let Err(err) = result {
            log::warn!("event=render module=cli status=error error={err}");
        }
    }
}

pub fn render_request(out: &mut impl Write, request: &RenderRequest<'_>) -> io::Result<()> {
    if request.outcome == Outcome::NoOp {
        writeln!(out, "({}: nothing changed)", request.command.label())?;
    }
    render_list(
        out,
        request.view,
        request.controls,
        request.pending_count,
        request.total_count,
    )
}

/// Writes one numbered row per item followed by a summary line.
///
/// Row numbers are 1-based positions in `view` and can be used as ids.
pub fn render_list(
    out: &mut impl Write,
    view: &[Item],
    controls: &ViewControls,
    pending: usize,
    total: usize,
) -> io::Result<()> {
    if view.is_empty() {
        writeln!(out, "  (no items)")?;
    }
    for (index, item) in view.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. [{}] {} x{}  #{}",
            index + 1,
            if item.done { 'x' } else { ' ' },
            item.name,
            format_qty(item.qty),
            short_id(item),
        )?;
    }

    write!(out, "{pending} pending / {total} total")?;
    write!(
        out,
        "  [filter={} sort={}",
        controls.filter.as_str(),
        controls.sort.as_str()
    )?;
    if !controls.search.trim().is_empty() {
        write!(out, " search=\"{}\"", controls.search.trim())?;
    }
    writeln!(out, "]")
}

pub fn render_stats(out: &mut impl Write, pending: usize, total: usize) -> io::Result<()> {
    writeln!(out, "pending: {pending}")?;
    writeln!(out, "done: {}", total - pending)?;
    writeln!(out, "total: {total}")
}

fn short_id(item: &Item) -> &str {
    let id = item.id.as_str();
    id.char_indices()
        .nth(SHORT_ID_CHARS)
        .map_or(id, |(end, _)| &id[..end])
}

fn format_qty(qty: f64) -> String {
    if qty.is_nan() {
        "NaN".to_string()
    } else if qty.is_infinite() {
        let sign = if qty > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else {
        qty.to_string()
    }
}
