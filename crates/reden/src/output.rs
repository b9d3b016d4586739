use std::io::Write;

use anyhow::{Context, Result};
use politikdokumente_core::{Speech, FIELD_NAMES};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Header row plus one row per speech.
    #[default]
    Csv,
    /// One JSON object per line.
    Jsonl,
}

/// Serializes speeches in input order. No reordering, no deduplication.
pub enum SpeechWriter<W: Write> {
    Csv(csv::Writer<W>),
    Jsonl(W),
}

impl<W: Write> SpeechWriter<W> {
    /// For CSV the header row is written immediately, so an empty crawl still
    /// produces a valid file.
    pub fn new(format: OutputFormat, sink: W) -> Result<Self> {
        match format {
            OutputFormat::Csv => {
                let mut writer = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(sink);
                writer.write_record(FIELD_NAMES).context("failed to write CSV header")?;
                Ok(Self::Csv(writer))
            }
            OutputFormat::Jsonl => Ok(Self::Jsonl(sink)),
        }
    }

    pub fn write(&mut self, speech: &Speech) -> Result<()> {
        match self {
            Self::Csv(writer) => writer
                .write_record(speech.to_row())
                .with_context(|| format!("failed to write CSV row for {}", speech.link)),
            Self::Jsonl(sink) => {
                serde_json::to_writer(&mut *sink, speech)
                    .with_context(|| format!("failed to serialize {}", speech.link))?;
                sink.write_all(b"\n")?;
                sink.flush()?;
                Ok(())
            }
        }
    }

    pub fn finish(self) -> Result<()> {
        match self {
            Self::Csv(mut writer) => writer.flush().context("failed to flush CSV output"),
            Self::Jsonl(mut sink) => sink.flush().context("failed to flush output"),
        }
    }
}

pub fn write_csv<W: Write>(speeches: &[Speech], sink: W) -> Result<()> {
    let mut writer = SpeechWriter::new(OutputFormat::Csv, sink)?;
    for speech in speeches {
        writer.write(speech)?;
    }
    writer.finish()
}
