//! Quote
//!
//! Console rendering of a priced package selection.

use std::io;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
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
    packages::Package,
    pricing::{Extras, SelectionPrice},
};

/// Errors that can occur when writing a quote.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// IO error
    #[error("failed to write quote: {0}")]
    Io(#[from] io::Error),
}

/// One priced line of a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteLine<'a> {
    /// What is being paid for
    pub label: String,

    /// Units
    pub quantity: u32,

    /// Line amount
    pub amount: Money<'a, Currency>,
}

/// Priced selection ready to show to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote<'a> {
    lines: SmallVec<[QuoteLine<'a>; 3]>,
    per_person: Option<(Money<'a, Currency>, Money<'a, Currency>)>,
    total: Money<'a, Currency>,
    savings: Option<Money<'a, Currency>>,
}

impl<'a> Quote<'a> {
    /// Build a quote for `package` priced as `price`. Extras with a zero count
    /// are left out.
    pub fn new(package: &Package<'a>, price: &SelectionPrice<'a>, extras: Extras) -> Self {
        let mut lines = SmallVec::new();
        let title = if package.period.is_empty() {
            package.name.clone()
        } else {
            format!("{} ({})", package.name, package.period)
        };

        let per_person = match price {
            SelectionPrice::Individual(price) => {
                lines.push(QuoteLine {
                    label: title,
                    quantity: 1,
                    amount: price.base,
                });

                for (label, quantity, amount) in [
                    ("Extra photos", extras.photos, price.photos),
                    ("Extra videos", extras.videos, price.videos),
                ] {
                    if quantity > 0 {
                        lines.push(QuoteLine {
                            label: label.to_string(),
                            quantity,
                            amount,
                        });
                    }
                }

                None
            }
            SelectionPrice::Group(quote) => {
                lines.push(QuoteLine {
                    label: title,
                    quantity: quote.people,
                    amount: quote.total,
                });

                Some((quote.per_person, quote.individual_fee))
            }
        };

        Self {
            lines,
            per_person,
            total: price.total(),
            savings: price.savings(),
        }
    }

    /// Priced lines
    pub fn lines(&self) -> &[QuoteLine<'a>] {
        &self.lines
    }

    /// Amount due
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Group savings, if any
    pub fn savings(&self) -> Option<Money<'a, Currency>> {
        self.savings
    }

    /// Writes the quote table and summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), QuoteError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Amount"]);

        for line in &self.lines {
            builder.push_record([
                line.label.clone(),
                line.quantity.to_string(),
                line.amount.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..3), Alignment::right());

        writeln!(out, "\n{table}")?;

        let mut summary: SmallVec<[(&str, String); 3]> = SmallVec::new();

        if let Some((per_person, fee)) = self.per_person {
            summary.push(("Per person:", format!("{per_person} (was {fee})")));
        }

        summary.push(("Total:", self.total.to_string()));

        if let Some(savings) = self.savings {
            summary.push(("Savings:", savings.to_string()));
        }

        let label_width = summary.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

        for (label, value) in &summary {
            writeln!(out, " {label:>label_width$}  {value}")?;
        }

        writeln!(out)?;

        Ok(())
    }
}
