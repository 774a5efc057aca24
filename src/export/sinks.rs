use crate::errors::ExportError;
use crate::source::FieldSpec;
use std::io::{BufWriter, Write};

/// Receives rendered cells record by record.
pub trait RecordSink {
    fn begin(&mut self, fields: &[&FieldSpec]) -> Result<(), ExportError>;
    fn write_record(
        &mut self,
        fields: &[&FieldSpec],
        values: &[String],
    ) -> Result<(), ExportError>;
    fn finish(self: Box<Self>) -> Result<(), ExportError>;
}

/// Header line plus one delimited line per record.
///
/// Cells are written verbatim (`QuoteStyle::Never`): a value containing the
/// delimiter or a newline shifts the columns of its row. A row made of one
/// empty cell is written as an empty line, not as csv's `""` marker.
pub struct TableSink<W: Write> {
    w: BufWriter<W>,
    builder: csv::WriterBuilder,
}

impl<W: Write> TableSink<W> {
    pub fn new(inner: W, delimiter: u8) -> Self {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(delimiter)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'));
        Self {
            w: BufWriter::new(inner),
            builder,
        }
    }

    fn write_line<I, T>(&mut self, cells: I) -> Result<(), ExportError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut line = self.builder.from_writer(&mut self.w);
        line.write_record(cells)?;
        line.flush()?;
        Ok(())
    }
}

impl<W: Write> RecordSink for TableSink<W> {
    fn begin(&mut self, fields: &[&FieldSpec]) -> Result<(), ExportError> {
        self.write_line(fields.iter().map(|f| f.label))
    }

    fn write_record(
        &mut self,
        _fields: &[&FieldSpec],
        values: &[String],
    ) -> Result<(), ExportError> {
        if let [only] = values {
            if only.is_empty() {
                self.w.write_all(b"\n")?;
                return Ok(());
            }
        }
        self.write_line(values)
    }

    fn finish(mut self: Box<Self>) -> Result<(), ExportError> {
        self.w.flush()?;
        Ok(())
    }
}

/// `Label: value` lines per record, each record closed by a `---` line and
/// records separated by a blank line.
pub struct ReportSink<W: Write> {
    w: BufWriter<W>,
    records: u64,
}
impl<W: Write> ReportSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            w: BufWriter::new(inner),
            records: 0,
        }
    }
}

impl<W: Write> RecordSink for ReportSink<W> {
    fn begin(&mut self, _fields: &[&FieldSpec]) -> Result<(), ExportError> {
        Ok(())
    }

    fn write_record(
        &mut self,
        fields: &[&FieldSpec],
        values: &[String],
    ) -> Result<(), ExportError> {
        if self.records > 0 {
            writeln!(self.w)?;
        }
        for (f, v) in fields.iter().zip(values) {
            writeln!(self.w, "{}: {}", f.label, v)?;
        }
        writeln!(self.w, "---")?;
        self.records += 1;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<(), ExportError> {
        self.w.flush()?;
        Ok(())
    }
}
