use anyhow::{Context, Result};
use hose_smiles::database::{build_lookup, write_lookup_csv};
use hose_smiles::init_logging;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use tracing::*;

fn main() -> Result<()> {
    init_logging(&std::env::var("HOSE_LOG").unwrap_or_else(|_| "info".to_string()));

    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "nmrshiftdb.csv".to_string());
    let output = args.next().unwrap_or_else(|| "hose_shift_lookup.csv".to_string());

    let reader = BufReader::new(
        File::open(&input).context(format!("Failed to open database {input}"))?,
    );
    let (lookup, stats) = build_lookup(reader)?;

    let writer = BufWriter::new(
        File::create(&output).context(format!("Failed to create {output}"))?,
    );
    write_lookup_csv(&lookup, writer)?;

    info!("Total lines:         {}", stats.total);
    info!("Parsed successfully: {}", stats.parsed);
    info!("Converted to SMILES: {}", stats.converted);
    info!("Failed (parse):      {}", stats.failed_parse);
    info!("Failed (convert):    {}", stats.failed_convert);
    info!("No HOSE code:        {}", stats.no_hose_code);
    info!("Lookup written to {output}");
    Ok(())
}
