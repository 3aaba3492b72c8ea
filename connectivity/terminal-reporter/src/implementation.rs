use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, PrintStyledContent, Stylize},
    terminal::{Clear, ClearType},
};
use sources_common::{EquityQuote, ForexQuote, MarketSnapshot};

const NAME_WIDTH: usize = 30;

/// Clear the screen and draw the exchange rate block, then the block of
/// equities listed on `foreign_market`. Other listings are not shown.
pub fn render<W: Write>(
    out: &mut W,
    snapshot: &MarketSnapshot,
    foreign_market: &str,
) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    heading(out, "=== EXCHANGE RATES ===")?;
    writeln!(
        out,
        "Updated: {}\n",
        snapshot.updated_at.format("%Y-%m-%d %H:%M:%S")
    )?;

    if snapshot.forex.is_empty() {
        notice(out, "No exchange rate data available", Color::Red)?;
    }
    for quote in &snapshot.forex {
        forex_row(out, quote)?;
    }

    writeln!(out)?;
    heading(out, "=== ARGENTINE STOCK MARKET ===")?;

    let listed: Vec<_> = snapshot
        .equities
        .iter()
        .filter(|quote| quote.market == foreign_market)
        .collect();

    if listed.is_empty() {
        writeln!(out)?;
        notice(out, "No stock market data available", Color::Red)?;
    } else {
        writeln!(out)?;
        let caption = match &snapshot.rate {
            Some(rate) => format!(
                "{foreign_market} listed equities in local currency, {} at {:.2}",
                rate.name, rate.rate
            ),
            None => format!("{foreign_market} listed equities in source currency, no official rate"),
        };
        notice(out, &caption, Color::Yellow)?;
        writeln!(out)?;

        for quote in listed {
            equity_row(out, quote)?;
        }
    }

    writeln!(out)?;
    notice(out, "Press Ctrl+C to stop", Color::Yellow)?;
    out.flush()
}

fn heading<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    notice(out, text, Color::Cyan)
}

fn notice<W: Write>(out: &mut W, text: &str, color: Color) -> io::Result<()> {
    queue!(out, PrintStyledContent(text.with(color)), Print("\n"))
}

fn change_color(change: f64) -> Color {
    if change >= 0.0 {
        Color::Green
    } else {
        Color::Red
    }
}

fn forex_row<W: Write>(out: &mut W, quote: &ForexQuote) -> io::Result<()> {
    // pad before styling, escape codes would count towards the width
    queue!(
        out,
        PrintStyledContent(format!("{:<12}", quote.name).white()),
        Print(format!("${:.2} ", quote.price)),
        PrintStyledContent(
            format!("{:+.2} ({:+.2}%)", quote.change, quote.change_percent)
                .with(change_color(quote.change))
        ),
        Print("\n")
    )
}

fn equity_row<W: Write>(out: &mut W, quote: &EquityQuote) -> io::Result<()> {
    let name: String = quote.name.chars().take(NAME_WIDTH).collect();

    queue!(
        out,
        PrintStyledContent(format!("{:<10}", quote.symbol).yellow()),
        PrintStyledContent(format!("{:<width$}", name, width = NAME_WIDTH + 1).cyan()),
        Print(format!("${:.2} ", quote.price)),
        PrintStyledContent(
            format!("{:+.2} ({:+.2}%)", quote.change, quote.change_percent)
                .with(change_color(quote.change))
        ),
        Print(format!(" Vol: {}\n", quote.volume))
    )
}
