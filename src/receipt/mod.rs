//! Receipt

use std::{fmt::Write, io};

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    discounts::to_percent_points,
    session::CompletedOrder,
    totals::Totals,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
}

/// Itemised breakdown of an order.
#[derive(Debug, Clone)]
pub struct Receipt {
    lines: Vec<CartLine>,
    totals: Totals,
}

impl Receipt {
    /// Create a receipt for the current contents of a cart.
    #[must_use]
    pub fn new(cart: &Cart, totals: Totals) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            totals,
        }
    }

    /// Lines on the receipt
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Totals on the receipt
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Writes the receipt table and summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Package", "Qty", "Unit Price", "Line Total"]);

        for line in &self.lines {
            builder.push_record([
                line.title().to_string(),
                line.package().to_string(),
                line.quantity().to_string(),
                line.unit_price()
                    .to_money(self.totals.currency())
                    .to_string(),
                self.totals.money(line.line_total()).to_string(),
            ]);
        }

        write_receipt_table(&mut out, builder)?;

        write_receipt_summary(&mut out, &self.totals)
    }
}

impl From<CompletedOrder> for Receipt {
    fn from(order: CompletedOrder) -> Self {
        Self {
            lines: order.lines,
            totals: order.totals,
        }
    }
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}")?;

    Ok(())
}

fn write_receipt_summary(out: &mut impl io::Write, totals: &Totals) -> Result<(), ReceiptError> {
    let mut rows: Vec<(String, String)> = Vec::with_capacity(totals.adjustments().len() + 3);

    rows.push((
        " Subtotal:".to_string(),
        format!("{}  ", totals.money(totals.sub_total())),
    ));

    for adjustment in totals.adjustments() {
        rows.push((
            format!(" {}:", adjustment.kind.label()),
            format!("-{}  ", totals.money(adjustment.amount)),
        ));
    }

    rows.push((
        " \x1b[1mTotal:\x1b[0m".to_string(),
        format!("\x1b[1m{}  \x1b[0m", totals.money(totals.final_total())),
    ));

    let savings_percent_points = to_percent_points(totals.savings_percent());

    rows.push((
        " Savings:".to_string(),
        format!(
            "({savings_percent_points:.2}%) {}  ",
            totals.money(totals.savings())
        ),
    ));

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or(0);

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or(0);

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out)?;

    Ok(())
}

fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )?;

    Ok(())
}
