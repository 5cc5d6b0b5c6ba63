use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use idforge_core::GeneratedId;

const HEADER: [&str; 3] = ["scheme", "label", "value"];

/// Write a batch as CSV with a `scheme,label,value` header.
pub fn write_batch_csv(path: &Path, items: &[GeneratedId]) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(HEADER)?;
    for item in items {
        writer.write_record([
            item.scheme.as_str(),
            item.label.as_deref().unwrap_or_default(),
            item.value.as_str(),
        ])?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
