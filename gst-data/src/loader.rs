//! CSV loaders for invoice line items.
//!
//! ## Line-item CSV
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column        | Required | Type    | Notes |
//! |---------------|----------|---------|-------|
//! | `quantity`    | yes      | decimal | Fractional for weight based units |
//! | `unit_price`  | yes      | decimal | Rupees, exclusive of GST |
//! | `gst_rate`    | yes      | decimal | Percentage, e.g. `18` |
//! | `discount`    | no       | decimal | Flat line discount; empty means none |
//! | `description` | no       | string  | Kept as a custom field |
//! | `hsn_code`    | no       | string  | Kept as a custom field |
//!
//! ```csv
//! quantity,unit_price,discount,gst_rate,description
//! 1,1000,100,12,Office chair
//! 3,50,,5,Notebook
//! ```
//!
//! ## Invoice-lines CSV
//!
//! The line-item columns plus these invoice-level columns:
//!
//! | Column             | Required | Type    | Notes |
//! |--------------------|----------|---------|-------|
//! | `invoice_number`   | yes      | string  | Rows sharing a number form one invoice |
//! | `seller_state`     | yes      | string  | Same state on every row of an invoice |
//! | `buyer_state`      | yes      | string  | Same state on every row of an invoice |
//! | `overall_discount` | no       | decimal | Invoice-level discount |
//! | `amount_paid`      | no       | decimal | Amount received against the invoice |
//!
//! States are compared ignoring case and spacing. An invoice-level amount may
//! be given on any row of its invoice and left empty on the others; rows that
//! do give it must agree. An amount given on no row is zero.
//!
//! ```csv
//! invoice_number,seller_state,buyer_state,quantity,unit_price,gst_rate,overall_discount,amount_paid
//! INV-001,Goa,Goa,1,800,18,100,500
//! INV-001,Goa,Goa,2,100,5,,
//! ```
//!
//! Invoices are returned in the order their number first appears.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use gst_core::{CustomFieldValue, InvoiceContext, LineItem, same_state};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Custom field name for the free-text item description.
pub const DESCRIPTION_FIELD: &str = "description";

/// Custom field name for the HSN/SAC classification code.
pub const HSN_CODE_FIELD: &str = "hsn_code";

/// Errors that can occur while reading invoice CSV data.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Bad structure, a missing required column or a value of the wrong type.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// `row` is 1-based, counting data rows only.
    #[error("row {row} has no invoice number")]
    MissingInvoiceNumber { row: usize },

    /// Rows of one invoice disagree on the seller or buyer state.
    #[error("row {row}: invoice {invoice_number} already has states {expected}")]
    ConflictingStates {
        invoice_number: String,
        row: usize,
        expected: String,
    },

    /// Rows of one invoice give different values for an invoice-level amount.
    #[error("row {row}: invoice {invoice_number} already has {column} {expected}, got {found}")]
    ConflictingAmounts {
        invoice_number: String,
        row: usize,
        column: &'static str,
        expected: Decimal,
        found: Decimal,
    },
}

#[derive(Debug, Deserialize)]
struct LineItemRow {
    quantity: Decimal,
    unit_price: Decimal,
    gst_rate: Decimal,
    discount: Option<Decimal>,
    description: Option<String>,
    hsn_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvoiceLineRow {
    invoice_number: String,
    seller_state: String,
    buyer_state: String,
    overall_discount: Option<Decimal>,
    amount_paid: Option<Decimal>,
    quantity: Decimal,
    unit_price: Decimal,
    gst_rate: Decimal,
    discount: Option<Decimal>,
    description: Option<String>,
    hsn_code: Option<String>,
}

/// Invoice-level values carried by one invoice-lines row.
struct InvoiceFields {
    invoice_number: String,
    seller_state: String,
    buyer_state: String,
    overall_discount: Option<Decimal>,
    amount_paid: Option<Decimal>,
}

impl InvoiceLineRow {
    fn split(self) -> (InvoiceFields, LineItemRow) {
        (
            InvoiceFields {
                invoice_number: self.invoice_number,
                seller_state: self.seller_state,
                buyer_state: self.buyer_state,
                overall_discount: self.overall_discount,
                amount_paid: self.amount_paid,
            },
            LineItemRow {
                quantity: self.quantity,
                unit_price: self.unit_price,
                gst_rate: self.gst_rate,
                discount: self.discount,
                description: self.description,
                hsn_code: self.hsn_code,
            },
        )
    }
}

/// An invoice being assembled, with the amounts stated so far.
struct PendingInvoice {
    draft: InvoiceDraft,
    overall_discount: Option<Decimal>,
    amount_paid: Option<Decimal>,
}

impl PendingInvoice {
    fn new(fields: &InvoiceFields) -> Self {
        Self {
            draft: InvoiceDraft {
                invoice_number: fields.invoice_number.clone(),
                context: InvoiceContext::default()
                    .with_states(fields.seller_state.clone(), fields.buyer_state.clone()),
            },
            overall_discount: None,
            amount_paid: None,
        }
    }

    fn absorb(
        &mut self,
        fields: InvoiceFields,
        line: LineItem,
        row: usize,
    ) -> Result<(), LoaderError> {
        let context = &self.draft.context;
        if !same_state(&context.seller_state, &fields.seller_state)
            || !same_state(&context.buyer_state, &fields.buyer_state)
        {
            return Err(LoaderError::ConflictingStates {
                expected: format!("{} -> {}", context.seller_state, context.buyer_state),
                invoice_number: fields.invoice_number,
                row,
            });
        }

        let stated = [
            ("overall_discount", &mut self.overall_discount, fields.overall_discount),
            ("amount_paid", &mut self.amount_paid, fields.amount_paid),
        ];
        for (column, known, found) in stated {
            let Some(found) = found else { continue };
            if let Some(expected) = *known {
                if expected != found {
                    return Err(LoaderError::ConflictingAmounts {
                        invoice_number: fields.invoice_number,
                        row,
                        column,
                        expected,
                        found,
                    });
                }
            }
            *known = Some(found);
        }

        self.draft.context.line_items.push(line);
        Ok(())
    }

    fn finish(self) -> InvoiceDraft {
        let mut draft = self.draft;
        draft.context = draft
            .context
            .with_overall_discount(self.overall_discount.unwrap_or(Decimal::ZERO))
            .with_amount_paid(self.amount_paid.unwrap_or(Decimal::ZERO));
        draft
    }
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        let mut item = LineItem::new(
            row.quantity,
            row.unit_price,
            row.discount.unwrap_or(Decimal::ZERO),
            row.gst_rate,
        );

        let text_fields = [
            (DESCRIPTION_FIELD, row.description),
            (HSN_CODE_FIELD, row.hsn_code),
        ];
        for (name, value) in text_fields {
            if let Some(text) = value.filter(|t| !t.is_empty()) {
                item = item.with_custom_field(name, CustomFieldValue::Text(text));
            }
        }

        item
    }
}

/// One invoice assembled from an invoice-lines CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub context: InvoiceContext,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader)
}

fn read_file(path: &Path) -> Result<String, LoaderError> {
    std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Loader for a single invoice's line items.
pub struct LineItemLoader;

impl LineItemLoader {
    /// Parses line items in file order.
    ///
    /// Values are not validated here; the totals calculator rejects invalid
    /// lines with their position.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<LineItem>, LoaderError> {
        csv_reader(reader)
            .deserialize::<LineItemRow>()
            .map(|result| result.map(LineItem::from).map_err(LoaderError::from))
            .collect()
    }

    pub fn load_from_file(path: &Path) -> Result<Vec<LineItem>, LoaderError> {
        let contents = read_file(path)?;
        Self::parse(contents.as_bytes())
    }
}

/// Loader for many invoices stored one line per row.
pub struct InvoiceLinesLoader;

impl InvoiceLinesLoader {
    /// Parses and groups rows into invoice drafts.
    ///
    /// # Errors
    ///
    /// * [`LoaderError::Parse`] for malformed CSV or unparseable values
    /// * [`LoaderError::MissingInvoiceNumber`] for a blank invoice number
    /// * [`LoaderError::ConflictingStates`] when rows of one invoice name
    ///   different states
    /// * [`LoaderError::ConflictingAmounts`] when rows of one invoice give
    ///   different overall discounts or amounts paid
    pub fn parse<R: Read>(reader: R) -> Result<Vec<InvoiceDraft>, LoaderError> {
        let mut pending: Vec<PendingInvoice> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (idx, result) in csv_reader(reader).deserialize::<InvoiceLineRow>().enumerate() {
            let row_number = idx + 1;
            let (fields, line) = result?.split();

            if fields.invoice_number.is_empty() {
                return Err(LoaderError::MissingInvoiceNumber { row: row_number });
            }

            let position = match positions.get(&fields.invoice_number).copied() {
                Some(position) => position,
                None => {
                    positions.insert(fields.invoice_number.clone(), pending.len());
                    pending.push(PendingInvoice::new(&fields));
                    pending.len() - 1
                }
            };

            pending[position].absorb(fields, LineItem::from(line), row_number)?;
        }

        Ok(pending.into_iter().map(PendingInvoice::finish).collect())
    }

    pub fn load_from_file(path: &Path) -> Result<Vec<InvoiceDraft>, LoaderError> {
        let contents = read_file(path)?;
        Self::parse(contents.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const MINIMAL_ITEMS: &str = "\
quantity,unit_price,gst_rate
2,100,18
";

    const FULL_ITEMS: &str = "\
quantity,unit_price,discount,gst_rate,description,hsn_code
1,1000,100,12,Office chair,9401
3,50,,5,Notebook,
";

    const INVOICE_LINES: &str = "\
invoice_number,seller_state,buyer_state,quantity,unit_price,discount,gst_rate
INV-001,Maharashtra,Maharashtra,2,100,,18
INV-002,Maharashtra,Delhi,1,1000,100,12
INV-001,Maharashtra,Maharashtra,1,40,,5
";

    // =========================================================================
    // LineItemLoader tests
    // =========================================================================

    #[test]
    fn test_parse_minimal_line_items() {
        let items = LineItemLoader::parse(MINIMAL_ITEMS.as_bytes()).expect("should parse");

        assert_eq!(items, vec![LineItem::new(dec!(2), dec!(100), dec!(0), dec!(18))]);
    }

    #[test]
    fn test_parse_full_line_items() {
        let items = LineItemLoader::parse(FULL_ITEMS.as_bytes()).expect("should parse");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].line_discount, dec!(100));
        assert_eq!(items[0].tax_rate_percent, dec!(12));
        assert_eq!(items[0].custom_text(DESCRIPTION_FIELD), Some("Office chair"));
        assert_eq!(items[0].custom_text(HSN_CODE_FIELD), Some("9401"));
    }

    #[test]
    fn test_empty_optional_cells_are_absent() {
        let items = LineItemLoader::parse(FULL_ITEMS.as_bytes()).expect("should parse");

        assert_eq!(items[1].line_discount, dec!(0));
        assert_eq!(items[1].custom_text(HSN_CODE_FIELD), None);
        assert_eq!(items[1].custom_fields.len(), 1);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let csv = "quantity , unit_price , gst_rate\n 2.5 , 64.40 , 5 \n";

        let items = LineItemLoader::parse(csv.as_bytes()).expect("should parse");

        assert_eq!(items[0].quantity, dec!(2.5));
        assert_eq!(items[0].unit_price, dec!(64.40));
    }

    #[test]
    fn test_parse_keeps_invalid_values_for_the_calculator() {
        let csv = "quantity,unit_price,gst_rate\n0,-5,18\n";

        let items = LineItemLoader::parse(csv.as_bytes()).expect("should parse");

        assert_eq!(items[0].quantity, dec!(0));
        assert_eq!(items[0].unit_price, dec!(-5));
    }

    #[test]
    fn test_parse_missing_required_column() {
        let csv = "quantity,unit_price\n1,100\n";

        let err = LineItemLoader::parse(csv.as_bytes()).expect_err("should fail");

        let LoaderError::Parse(inner) = err else {
            panic!("expected Parse error, got: {err:?}");
        };
        assert!(
            inner.to_string().contains("missing field"),
            "expected 'missing field', got: {inner}"
        );
    }

    #[test]
    fn test_parse_rejects_bad_decimal() {
        let csv = "quantity,unit_price,gst_rate\none,100,18\n";

        let result = LineItemLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(LoaderError::Parse(_))));
    }

    #[test]
    fn test_parse_header_only() {
        let items = LineItemLoader::parse("quantity,unit_price,gst_rate\n".as_bytes())
            .expect("should parse");

        assert!(items.is_empty());
    }

    // =========================================================================
    // InvoiceLinesLoader tests
    // =========================================================================

    #[test]
    fn test_rows_are_grouped_by_invoice_in_first_seen_order() {
        let drafts = InvoiceLinesLoader::parse(INVOICE_LINES.as_bytes()).expect("should parse");

        let numbers: Vec<&str> = drafts.iter().map(|d| d.invoice_number.as_str()).collect();
        assert_eq!(numbers, vec!["INV-001", "INV-002"]);
        assert_eq!(drafts[0].context.line_items.len(), 2);
        assert_eq!(drafts[1].context.line_items.len(), 1);
    }

    #[test]
    fn test_invoice_states_come_from_rows() {
        let drafts = InvoiceLinesLoader::parse(INVOICE_LINES.as_bytes()).expect("should parse");

        assert_eq!(drafts[1].context.seller_state, "Maharashtra");
        assert_eq!(drafts[1].context.buyer_state, "Delhi");
        assert_eq!(drafts[1].context.overall_discount, dec!(0));
    }

    #[test]
    fn test_blank_invoice_number_is_rejected() {
        let csv = "\
invoice_number,seller_state,buyer_state,quantity,unit_price,discount,gst_rate
INV-001,Goa,Goa,1,10,,5
,Goa,Goa,1,10,,5
";

        let err = InvoiceLinesLoader::parse(csv.as_bytes()).expect_err("should fail");

        assert!(matches!(err, LoaderError::MissingInvoiceNumber { row: 2 }));
    }

    #[test]
    fn test_conflicting_states_are_rejected() {
        let csv = "\
invoice_number,seller_state,buyer_state,quantity,unit_price,discount,gst_rate
INV-001,Goa,Goa,1,10,,5
INV-001,Goa,Kerala,1,10,,5
";

        let err = InvoiceLinesLoader::parse(csv.as_bytes()).expect_err("should fail");

        match err {
            LoaderError::ConflictingStates {
                invoice_number,
                row,
                expected,
            } => {
                assert_eq!(invoice_number, "INV-001");
                assert_eq!(row, 2);
                assert_eq!(expected, "Goa -> Goa");
            }
            other => panic!("expected ConflictingStates, got {other:?}"),
        }
    }

    #[test]
    fn test_states_match_ignoring_case_and_spacing() {
        let csv = "\
invoice_number,seller_state,buyer_state,quantity,unit_price,discount,gst_rate
INV-001,Tamil Nadu,Goa,1,10,,5
INV-001,tamil  nadu,GOA,1,10,,5
";

        let drafts = InvoiceLinesLoader::parse(csv.as_bytes()).expect("should parse");

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].context.line_items.len(), 2);
        assert_eq!(drafts[0].context.seller_state, "Tamil Nadu");
    }

    #[test]
    fn test_blank_state_conflicts_with_named_state() {
        let csv = "\
invoice_number,seller_state,buyer_state,quantity,unit_price,discount,gst_rate
INV-001,Goa,Kerala,1,10,,5
INV-001,Goa,,1,10,,5
";

        let err = InvoiceLinesLoader::parse(csv.as_bytes()).expect_err("should fail");

        assert!(matches!(err, LoaderError::ConflictingStates { row: 2, .. }));
    }

    // =========================================================================
    // invoice-level amount tests
    // =========================================================================

    const INVOICE_AMOUNTS: &str = "\
invoice_number,seller_state,buyer_state,quantity,unit_price,gst_rate,overall_discount,amount_paid
INV-001,Goa,Goa,1,800,18,100,
INV-002,Goa,Kerala,1,50,5,,
INV-001,Goa,Goa,2,100,5,100,500
INV-001,Goa,Goa,1,10,0,,
";

    #[test]
    fn test_invoice_amounts_default_to_zero_without_columns() {
        let drafts = InvoiceLinesLoader::parse(INVOICE_LINES.as_bytes()).expect("should parse");

        assert_eq!(drafts[0].context.overall_discount, dec!(0));
        assert_eq!(drafts[0].context.amount_paid, dec!(0));
    }

    #[test]
    fn test_invoice_amounts_may_be_stated_on_any_row() {
        let drafts = InvoiceLinesLoader::parse(INVOICE_AMOUNTS.as_bytes()).expect("should parse");

        assert_eq!(drafts[0].invoice_number, "INV-001");
        assert_eq!(drafts[0].context.line_items.len(), 3);
        assert_eq!(drafts[0].context.overall_discount, dec!(100));
        assert_eq!(drafts[0].context.amount_paid, dec!(500));
        assert_eq!(drafts[1].context.overall_discount, dec!(0));
        assert_eq!(drafts[1].context.amount_paid, dec!(0));
    }

    #[test]
    fn test_conflicting_invoice_amounts_are_rejected() {
        let csv = "\
invoice_number,seller_state,buyer_state,quantity,unit_price,gst_rate,overall_discount,amount_paid
INV-001,Goa,Goa,1,800,18,100,
INV-001,Goa,Goa,2,100,5,,
INV-001,Goa,Goa,1,10,0,90,
";

        let err = InvoiceLinesLoader::parse(csv.as_bytes()).expect_err("should fail");

        match err {
            LoaderError::ConflictingAmounts {
                invoice_number,
                row,
                column,
                expected,
                found,
            } => {
                assert_eq!(invoice_number, "INV-001");
                assert_eq!(row, 3);
                assert_eq!(column, "overall_discount");
                assert_eq!(expected, dec!(100));
                assert_eq!(found, dec!(90));
            }
            other => panic!("expected ConflictingAmounts, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_equal_amounts_are_accepted() {
        let csv = "\
invoice_number,seller_state,buyer_state,quantity,unit_price,gst_rate,amount_paid
INV-001,Goa,Goa,1,800,18,250.00
INV-001,Goa,Goa,2,100,5,250
";

        let drafts = InvoiceLinesLoader::parse(csv.as_bytes()).expect("should parse");

        assert_eq!(drafts[0].context.amount_paid, dec!(250));
    }
}
