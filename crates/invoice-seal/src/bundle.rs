//! Building a bundle from files on disk.

use std::path::{Path, PathBuf};

use invoice_seal_core::{BundleBuilder, FileDescriptor, InvoiceInput};
use tracing::debug;

use crate::error::{Result, SubmissionError};

/// Build the ordered file list: the invoice record, then each attachment.
///
/// Each attachment is named after the final component of its path. Any
/// read failure aborts the whole bundle.
pub fn build_bundle<P: AsRef<Path>>(
    invoice: &InvoiceInput,
    attachments: &[P],
) -> Result<Vec<FileDescriptor>> {
    let mut builder = BundleBuilder::new(invoice)?;
    for path in attachments {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| SubmissionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = attachment_name(path)?;
        debug!(name = %name, bytes = data.len(), "adding attachment");
        builder.push_attachment(name, &data);
    }
    Ok(builder.build())
}

fn attachment_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| SubmissionError::Io {
            path: PathBuf::from(path),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no file name",
            ),
        })
}
