//! Proptest generators for property-based testing.

use proptest::prelude::*;

use invoice_seal_core::{
    FileDescriptor, Identity, InvoiceInput, InvoicePeriod, LineItem, LineItemType,
};

/// Generate a random identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>().prop_map(|seed| Identity::from_seed(&seed))
}

/// Generate a LineItemType.
pub fn line_item_type() -> impl Strategy<Value = LineItemType> {
    prop_oneof![
        Just(LineItemType::Labor),
        Just(LineItemType::Expense),
        Just(LineItemType::Misc),
    ]
}

/// Generate a valid invoice period.
pub fn period() -> impl Strategy<Value = InvoicePeriod> {
    (1u16..=12, 2000u16..=2100).prop_map(|(month, year)| InvoicePeriod { month, year })
}

/// Free text that survives a table round trip.
///
/// Leading whitespace is trimmed on parse, so text never starts with it.
/// Delimiters and quotes are allowed and get quoted on write.
pub fn text(max_len: usize) -> impl Strategy<Value = String> {
    let pattern = format!("[a-zA-Z0-9][a-zA-Z0-9 ,.\"#-]{{0,{max_len}}}");
    prop_oneof![
        Just(String::new()),
        proptest::string::string_regex(&pattern).expect("text pattern is a valid regex"),
    ]
}

/// A finite, non-negative amount.
pub fn amount() -> impl Strategy<Value = f64> {
    prop_oneof![
        (0u32..100_000).prop_map(f64::from),
        (0u32..10_000_000).prop_map(|cents| f64::from(cents) / 100.0),
        0.0f64..1e9,
    ]
}

/// Generate a line item (line number 0; see [`line_items`]).
pub fn line_item() -> impl Strategy<Value = LineItem> {
    (
        line_item_type(),
        text(12),
        text(40),
        "[0-9a-f]{0,16}",
        amount(),
        amount(),
    )
        .prop_map(
            |(item_type, subtype, description, proposal_token, hours, total_cost)| LineItem {
                line_number: 0,
                item_type,
                subtype,
                description,
                proposal_token,
                hours,
                total_cost,
            },
        )
}

/// Generate up to `max` line items numbered in row order.
pub fn line_items(max: usize) -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(line_item(), 0..=max).prop_map(|mut items| {
        for (i, item) in items.iter_mut().enumerate() {
            item.line_number = i as u16;
        }
        items
    })
}

/// Parameters for generating an invoice submission.
#[derive(Debug, Clone)]
pub struct InvoiceParams {
    pub invoice: InvoiceInput,
    pub attachments: Vec<(String, Vec<u8>)>,
    pub seed: [u8; 32],
}

impl InvoiceParams {
    /// The file list: invoice record first, then attachments.
    pub fn files(&self) -> Vec<FileDescriptor> {
        let mut files = Vec::with_capacity(self.attachments.len() + 1);
        if let Ok(invoice) = FileDescriptor::invoice(&self.invoice) {
            files.push(invoice);
        }
        files.extend(
            self.attachments
                .iter()
                .map(|(name, data)| FileDescriptor::new(name.clone(), data)),
        );
        files
    }

    pub fn identity(&self) -> Identity {
        Identity::from_seed(&self.seed)
    }
}

impl Arbitrary for InvoiceParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            period(),
            line_items(8),
            prop::collection::vec(
                ("[a-z]{1,8}\\.txt", prop::collection::vec(any::<u8>(), 0..256)),
                0..=4,
            ),
            any::<[u8; 32]>(),
        )
            .prop_map(|(period, items, attachments, seed)| InvoiceParams {
                invoice: InvoiceInput::new(period, items),
                attachments,
                seed,
            })
            .boxed()
    }
}
