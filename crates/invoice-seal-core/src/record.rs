//! Structured invoice records and the strict CSV schema they are parsed from.
//!
//! A record is either parsed in full or rejected: a single bad row fails the
//! whole table and no line items are returned.

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::types::{InvoicePeriod, LineItemType};

/// Field positions within a row.
mod fields {
    pub const TYPE: usize = 0;
    pub const SUBTYPE: usize = 1;
    pub const DESCRIPTION: usize = 2;
    pub const PROPOSAL_TOKEN: usize = 3;
    pub const HOURS: usize = 4;
    pub const TOTAL_COST: usize = 5;
}

/// Dialect and arity of an invoice table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvPolicy {
    /// Field separator.
    pub delimiter: u8,
    /// Lines starting with this byte are ignored.
    pub comment: u8,
    /// Exact number of fields every row must carry.
    pub field_count: usize,
}

impl Default for CsvPolicy {
    fn default() -> Self {
        Self {
            delimiter: b',',
            comment: b'#',
            field_count: 6,
        }
    }
}

/// One billed line of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// 0-based row index in the source table.
    #[serde(rename = "linenumber")]
    pub line_number: u16,
    #[serde(rename = "type")]
    pub item_type: LineItemType,
    pub subtype: String,
    pub description: String,
    /// Token of the proposal this work was done for (may be empty).
    #[serde(rename = "proposaltoken")]
    pub proposal_token: String,
    pub hours: f64,
    #[serde(rename = "totalcost")]
    pub total_cost: f64,
}

/// The structured record for one invoice: its period and ordered line items.
///
/// Field order here is the canonical encoding order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceInput {
    pub month: u16,
    pub year: u16,
    #[serde(rename = "lineitems")]
    pub line_items: Vec<LineItem>,
}

impl InvoiceInput {
    /// Create a record from already parsed line items.
    pub fn new(period: InvoicePeriod, line_items: Vec<LineItem>) -> Self {
        Self {
            month: period.month,
            year: period.year,
            line_items,
        }
    }

    /// Parse an invoice table and attach the billing period.
    pub fn from_csv(
        period: InvoicePeriod,
        raw: &[u8],
        policy: &CsvPolicy,
    ) -> Result<Self, RecordError> {
        let line_items = parse_invoice_csv(raw, policy)?;
        Ok(Self::new(period, line_items))
    }

    /// The billing period.
    pub fn period(&self) -> InvoicePeriod {
        InvoicePeriod {
            month: self.month,
            year: self.year,
        }
    }

    /// Sum of all line item costs.
    pub fn total_cost(&self) -> f64 {
        self.line_items.iter().map(|item| item.total_cost).sum()
    }

    /// Sum of all line item hours.
    pub fn total_hours(&self) -> f64 {
        self.line_items.iter().map(|item| item.hours).sum()
    }
}

/// Parse a delimited invoice table into line items.
///
/// Leading whitespace of every field is trimmed before quote detection, so
/// `a, "b, c"` yields two fields. Whitespace inside quotes is kept. Rows must have exactly
/// `policy.field_count` fields; field 0 must name a [`LineItemType`]
/// (case-insensitive); fields 4 and 5 must be finite numbers.
pub fn parse_invoice_csv(raw: &[u8], policy: &CsvPolicy) -> Result<Vec<LineItem>, RecordError> {
    let trimmed = trim_leading_space(raw, policy);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(policy.delimiter)
        .comment(Some(policy.comment))
        .from_reader(trimmed.as_slice());

    let mut line_items = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let fields: Vec<&str> = row.iter().collect();
        line_items.push(decode_row(line, &fields, policy)?);
    }

    Ok(line_items)
}

/// Drop blanks at the start of every field, ahead of quote detection.
///
/// Lines whose first non-blank byte is the comment byte or a line ending are
/// copied unchanged so they classify the same as without trimming.
fn trim_leading_space(raw: &[u8], policy: &CsvPolicy) -> Vec<u8> {
    let is_blank = |b: u8| matches!(b, b' ' | b'\t') && b != policy.delimiter;

    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    let mut line_start = true;
    let mut field_start = true;

    while i < raw.len() {
        if field_start {
            let text = raw[i..]
                .iter()
                .position(|&c| !is_blank(c))
                .map_or(raw.len(), |n| i + n);
            match raw.get(text).copied() {
                Some(c) if line_start && c == policy.comment => {
                    let end = raw[i..]
                        .iter()
                        .position(|&c| c == b'\n')
                        .map_or(raw.len(), |n| i + n + 1);
                    out.extend_from_slice(&raw[i..end]);
                    i = end;
                    continue;
                }
                None | Some(b'\n' | b'\r') if line_start => {}
                _ => i = text,
            }
            field_start = false;
            line_start = false;
            if raw.get(i) == Some(&b'"') {
                i = copy_quoted(raw, i, &mut out);
                continue;
            }
            if i >= raw.len() {
                break;
            }
        }

        let b = raw[i];
        out.push(b);
        if b == policy.delimiter {
            field_start = true;
        } else if b == b'\n' {
            field_start = true;
            line_start = true;
        }
        i += 1;
    }

    out
}

/// Copy the quoted section opening at `start`; returns the index after it.
fn copy_quoted(raw: &[u8], start: usize, out: &mut Vec<u8>) -> usize {
    out.push(b'"');
    let mut i = start + 1;
    while i < raw.len() {
        out.push(raw[i]);
        if raw[i] == b'"' {
            if raw.get(i + 1) == Some(&b'"') {
                out.push(b'"');
                i += 1;
            } else {
                return i + 1;
            }
        }
        i += 1;
    }
    i
}

/// Decode one row under the fixed-arity schema.
fn decode_row(line: usize, fields: &[&str], policy: &CsvPolicy) -> Result<LineItem, RecordError> {
    if fields.len() != policy.field_count || fields.len() <= fields::TOTAL_COST {
        return Err(RecordError::FieldCount {
            line,
            expected: policy.field_count,
            got: fields.len(),
        });
    }

    let line_number =
        u16::try_from(line).map_err(|_| RecordError::TooManyLineItems(line + 1))?;

    let hours = parse_number(line, "hours", fields[fields::HOURS])?;
    let total_cost = parse_number(line, "total cost", fields[fields::TOTAL_COST])?;

    let item_type = LineItemType::from_name(fields[fields::TYPE]).ok_or_else(|| {
        RecordError::UnknownLineItemType {
            line,
            value: fields[fields::TYPE].to_string(),
        }
    })?;

    Ok(LineItem {
        line_number,
        item_type,
        subtype: fields[fields::SUBTYPE].to_string(),
        description: fields[fields::DESCRIPTION].to_string(),
        proposal_token: fields[fields::PROPOSAL_TOKEN].to_string(),
        hours,
        total_cost,
    })
}

fn parse_number(line: usize, field: &'static str, value: &str) -> Result<f64, RecordError> {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(RecordError::InvalidNumber {
            line,
            field,
            value: value.to_string(),
        }),
    }
}

/// Write line items back out as a table that [`parse_invoice_csv`] accepts.
///
/// Line numbers are not written; they are reassigned from row order on parse.
pub fn write_invoice_csv(items: &[LineItem], policy: &CsvPolicy) -> Result<Vec<u8>, RecordError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(policy.delimiter)
        .from_writer(Vec::new());

    for item in items {
        writer.write_record([
            item.item_type.name().to_string(),
            item.subtype.clone(),
            item.description.clone(),
            item.proposal_token.clone(),
            item.hours.to_string(),
            item.total_cost.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| RecordError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# type, subtype, description, proposal, hours, cost
labor, dev, Built the thing, 5d9c0a, 20, 800
Expense, hosting, Server rental, , 0, 45.5
misc,,Conference ticket,,0,120
";

    fn parse(raw: &str) -> Result<Vec<LineItem>, RecordError> {
        parse_invoice_csv(raw.as_bytes(), &CsvPolicy::default())
    }

    #[test]
    fn test_parse_valid_table() {
        let items = parse(SAMPLE).unwrap();
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].line_number, 0);
        assert_eq!(items[0].item_type, LineItemType::Labor);
        assert_eq!(items[0].subtype, "dev");
        assert_eq!(items[0].description, "Built the thing");
        assert_eq!(items[0].proposal_token, "5d9c0a");
        assert_eq!(items[0].hours, 20.0);
        assert_eq!(items[0].total_cost, 800.0);

        assert_eq!(items[1].line_number, 1);
        assert_eq!(items[1].item_type, LineItemType::Expense);
        assert_eq!(items[1].proposal_token, "");
        assert_eq!(items[1].total_cost, 45.5);

        assert_eq!(items[2].line_number, 2);
        assert_eq!(items[2].item_type, LineItemType::Misc);
    }

    #[test]
    fn test_mixed_case_type_maps_to_enum() {
        let items = parse("Labor,a,b,c,1,2\n").unwrap();
        assert_eq!(items[0].item_type, LineItemType::Labor);
    }

    #[test]
    fn test_five_fields_rejected() {
        let raw = "labor,a,b,c,1,2\nlabor,a,b,1,2\n";
        match parse(raw) {
            Err(RecordError::FieldCount {
                line,
                expected,
                got,
            }) => {
                assert_eq!(line, 1);
                assert_eq!(expected, 6);
                assert_eq!(got, 5);
            }
            other => panic!("expected FieldCount, got {other:?}"),
        }
    }

    #[test]
    fn test_seven_fields_rejected() {
        assert!(matches!(
            parse("labor,a,b,c,1,2,extra\n"),
            Err(RecordError::FieldCount { got: 7, .. })
        ));
    }

    #[test]
    fn test_non_numeric_hours_rejected() {
        assert!(matches!(
            parse("labor,a,b,c,abc,2\n"),
            Err(RecordError::InvalidNumber { field: "hours", .. })
        ));
    }

    #[test]
    fn test_non_finite_cost_rejected() {
        assert!(matches!(
            parse("labor,a,b,c,1,NaN\n"),
            Err(RecordError::InvalidNumber { field: "total cost", .. })
        ));
        assert!(parse("labor,a,b,c,inf,1\n").is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(matches!(
            parse("travel,a,b,c,1,2\n"),
            Err(RecordError::UnknownLineItemType { line: 0, .. })
        ));
    }

    #[test]
    fn test_no_partial_output() {
        // The bad row is last; nothing before it may leak out.
        let raw = "labor,a,b,c,1,2\nexpense,a,b,c,1,2\nbogus,a,b,c,1,2\n";
        assert!(parse(raw).is_err());
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let raw = "# header\nlabor,a,b,c,1,2\n\n# trailing note\nmisc,a,b,c,0,3\n";
        let items = parse(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].line_number, 1);
    }

    #[test]
    fn test_quoted_field_with_delimiter() {
        let items = parse("labor,dev,\"fixed a, b and c\",tok,1.5,60\n").unwrap();
        assert_eq!(items[0].description, "fixed a, b and c");
        assert_eq!(items[0].hours, 1.5);
    }

    #[test]
    fn test_quoted_field_after_spaced_delimiter() {
        let items = parse("labor, dev, \"fixed a, b\", tok, 20, 800\n").unwrap();
        assert_eq!(items[0].subtype, "dev");
        assert_eq!(items[0].description, "fixed a, b");
        assert_eq!(items[0].proposal_token, "tok");
        assert_eq!(items[0].total_cost, 800.0);

        let items = parse("  \"Labor\", dev, \"say \"\"hi\"\"\", , 1, 2\n").unwrap();
        assert_eq!(items[0].item_type, LineItemType::Labor);
        assert_eq!(items[0].description, "say \"hi\"");
    }

    #[test]
    fn test_blanks_inside_quotes_kept() {
        let items = parse("labor, dev, \"  padded \", , 1, 2\n").unwrap();
        assert_eq!(items[0].description, "  padded ");
    }

    #[test]
    fn test_quote_in_comment_does_not_leak() {
        let raw = "# a \"stray, quote\nlabor, a, \"b, c\", d, 1, 2\n";
        let items = parse(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "b, c");
    }

    #[test]
    fn test_custom_policy() {
        let policy = CsvPolicy {
            delimiter: b';',
            comment: b'%',
            field_count: 6,
        };
        let raw = "% note\nlabor;a;b;c;1;2\n";
        let items = parse_invoice_csv(raw.as_bytes(), &policy).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_empty_table() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip_through_writer() {
        let policy = CsvPolicy::default();
        let items = parse(SAMPLE).unwrap();
        let written = write_invoice_csv(&items, &policy).unwrap();
        let reparsed = parse_invoice_csv(&written, &policy).unwrap();
        assert_eq!(items, reparsed);
    }

    #[test]
    fn test_invoice_input_from_csv() {
        let period = InvoicePeriod::new(2, 2019).unwrap();
        let invoice =
            InvoiceInput::from_csv(period, SAMPLE.as_bytes(), &CsvPolicy::default()).unwrap();
        assert_eq!(invoice.period(), period);
        assert_eq!(invoice.line_items.len(), 3);
        assert_eq!(invoice.total_cost(), 965.5);
        assert_eq!(invoice.total_hours(), 20.0);
    }
}
