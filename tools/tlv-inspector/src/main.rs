use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info};

use tlvstream::{FnSink, StreamDecoder, TlvNode};

/// Decode a TLV byte stream and print every frame as a tree
#[derive(Parser)]
#[command(name = "tlv-inspector", version, about)]
struct Cli {
    /// File to read; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Treat the input as hex text (whitespace is ignored)
    #[arg(long)]
    hex: bool,
    /// Bytes handed to the decoder per feed
    #[arg(long, default_value_t = 4096)]
    chunk_size: usize,
    #[arg(long, default_value_t = format!("INFO"))]
    log_level: String,
}

fn read_input(cli: &Cli) -> Result<Vec<u8>> {
    let raw = match &cli.input {
        Some(path) => fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
            buffer
        }
    };
    if !cli.hex {
        return Ok(raw);
    }

    let text: String = String::from_utf8(raw)
        .context("hex input is not utf-8")?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    hex::decode(&text).context("Invalid hex input")
}

fn print_frame(index: usize, node: &TlvNode) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "frame #{}:", index)?;
    write!(stdout, "{}", node)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = log::LevelFilter::from_str(&cli.log_level)?;
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .filter(None, log_level)
        .init();

    if cli.chunk_size == 0 {
        bail!("--chunk-size must be at least 1");
    }
    let data = read_input(&cli)?;
    info!("read {} bytes, feeding in chunks of {}", data.len(), cli.chunk_size);

    let mut printed = 0;
    let mut decoder = StreamDecoder::new(FnSink(|node: TlvNode| -> tlvstream::Result<()> {
        printed += 1;
        print_frame(printed, &node)?;
        Ok(())
    }));

    let mut failures = 0;
    for chunk in data.chunks(cli.chunk_size) {
        // A bad frame is dropped; keep draining whatever is still buffered behind it
        let mut result = decoder.feed(chunk);
        while let Err(err) = result {
            error!("{}", err);
            failures += 1;
            result = decoder.feed(&[]);
        }
    }

    let frames = decoder.frames_decoded();
    decoder.finish().context("Input ended inside a frame")?;
    info!("decoded {} frames", frames);

    if failures > 0 {
        bail!("{} malformed frames in input", failures);
    }
    Ok(())
}
