//! Terminal rendering of dispenser snapshots.

use std::io::{self, Write};

use dispenser::{Phase, Session};

const GAUGE_WIDTH: usize = 20;

pub fn gauge(fill_level: f64, width: usize) -> String {
    let filled = ((fill_level.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn describe(session: &Session) -> String {
    let status = match session.phase() {
        Phase::Idle if session.soda_menu_open() => "Choose a soda".to_string(),
        Phase::Idle => "Select your beverage".to_string(),
        Phase::Dispensing(beverage) => format!("Pouring {beverage}"),
        Phase::Full(beverage) => format!("{beverage} ready, take your cup"),
    };

    let mut line = format!(
        "{status:<32} {} {:>3.0}%",
        gauge(session.fill_level(), GAUGE_WIDTH),
        session.fill_level()
    );
    if session.ice_requested() {
        line.push_str(&format!("  ice x{}", session.ice_cubes().len()));
    }
    if session.lemon_requested() {
        line.push_str(&format!("  lemon x{}", session.lemon_slices().len()));
    }
    if session.bubbles_visible() {
        line.push_str("  *fizz*");
    }
    line
}

/// Redraws the status line in place; a full cup ends the line.
pub fn render_text(out: &mut impl Write, session: &Session) -> io::Result<()> {
    write!(out, "\r{}", describe(session))?;
    if session.is_full() {
        writeln!(out)?;
    }
    out.flush()
}

pub fn render_json(out: &mut impl Write, session: &Session) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, session)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispenser::{PourTiming, SeededRandom};
    use shared::domain::Beverage;

    #[test]
    fn gauge_scales_to_width() {
        assert_eq!(gauge(0.0, 4), "[----]");
        assert_eq!(gauge(50.0, 4), "[##--]");
        assert_eq!(gauge(150.0, 4), "[####]");
    }

    #[test]
    fn describes_a_garnished_pour() {
        let mut session = Session::default();
        session.toggle_ice(&mut SeededRandom::new(1));
        session.toggle_lemon();
        session.select_beverage(Beverage::Cola);
        session.tick(&PourTiming::default());

        let line = describe(&session);
        assert!(line.starts_with("Pouring Coca Cola"));
        assert!(line.contains("  1%"));
        assert!(line.contains("ice x5"));
        assert!(line.contains("lemon x2"));
        assert!(line.contains("*fizz*"));
    }

    #[test]
    fn json_lines_are_newline_terminated() {
        let mut out = Vec::new();
        render_json(&mut out, &Session::default()).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.ends_with('\n'));
        assert!(text.contains("\"state\":\"idle\""));
    }
}
