//! Batch conversion of an NMR shift database into a HOSE lookup table.
//!
//! Each database line reads `Solvent_Nucleus;HOSE_min_max_avg_count`.
//! Solvent names may themselves contain underscores, so the numeric
//! fields are peeled off from the right.

use crate::{central_atom_from_nucleus, convert};
use anyhow::{Context, Result};
use csv::Writer;
use std::collections::{BTreeMap, HashSet};
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::*;

const PROGRESS_INTERVAL: usize = 100_000;

#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("expected 5 '_' separated fields, found {0}")]
    MissingFields(usize),
    #[error("invalid numeric field {0:?}")]
    InvalidNumber(String),
    #[error("no ';' between nucleus and HOSE code")]
    MissingHoseSeparator,
}

/// One line of the shift database.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftRecord {
    pub solvent: String,
    pub nucleus: String,
    pub hose_code: String,
    pub min_shift: f64,
    pub max_shift: f64,
    pub avg_shift: f64,
    pub count: u32,
}

fn number<T: std::str::FromStr>(field: &str) -> Result<T, RecordError> {
    field
        .trim()
        .parse()
        .map_err(|_| RecordError::InvalidNumber(field.to_string()))
}

impl ShiftRecord {
    /// Parse one database line. Blank lines yield `Ok(None)`.
    pub fn parse_line(line: &str) -> Result<Option<Self>, RecordError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut fields: Vec<&str> = line.rsplitn(5, '_').collect();
        if fields.len() < 5 {
            return Err(RecordError::MissingFields(fields.len()));
        }
        fields.reverse();
        let (front, numbers) = (fields[0], &fields[1..]);
        let min_shift = number(numbers[0])?;
        let max_shift = number(numbers[1])?;
        let avg_shift = number(numbers[2])?;
        let count = number(numbers[3])?;

        let (before, hose_code) = front
            .split_once(';')
            .ok_or(RecordError::MissingHoseSeparator)?;
        let (solvent, nucleus) = before.rsplit_once('_').unwrap_or(("", before));

        Ok(Some(Self {
            solvent: solvent.to_string(),
            nucleus: nucleus.to_string(),
            hose_code: hose_code.to_string(),
            min_shift,
            max_shift,
            avg_shift,
            count,
        }))
    }
}

/// Shift statistics for one HOSE code in one solvent.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftStats {
    pub min: f64,
    pub max: f64,
    sum: f64,
    pub count: u32,
}

impl ShiftStats {
    fn from_record(record: &ShiftRecord) -> Self {
        Self {
            min: record.min_shift,
            max: record.max_shift,
            sum: record.avg_shift * f64::from(record.count),
            count: record.count,
        }
    }

    fn merge(&mut self, record: &ShiftRecord) {
        self.min = self.min.min(record.min_shift);
        self.max = self.max.max(record.max_shift);
        self.sum += record.avg_shift * f64::from(record.count);
        self.count = self.count.saturating_add(record.count);
    }

    /// Count-weighted mean of the merged averages.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / f64::from(self.count)
        }
    }
}

/// Everything known about one distinct HOSE code.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupEntry {
    pub central_atom: String,
    pub smiles: String,
    pub solvents: BTreeMap<String, ShiftStats>,
}

pub type Lookup = BTreeMap<String, LookupEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub total: usize,
    pub parsed: usize,
    pub converted: usize,
    pub failed_parse: usize,
    pub failed_convert: usize,
    pub no_hose_code: usize,
}

/// Read database lines from `reader` and build the HOSE lookup table.
///
/// Each distinct HOSE code is converted once; records with a code that
/// fails to convert are counted and skipped.
pub fn build_lookup<R: BufRead>(reader: R) -> Result<(Lookup, BuildStats)> {
    let mut lookup = Lookup::new();
    let mut failed_codes = HashSet::new();
    let mut stats = BuildStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context(format!("Failed to read database line {}", index + 1))?;
        stats.total += 1;

        let record = match ShiftRecord::parse_line(&line) {
            Ok(Some(record)) => record,
            Ok(None) => {
                stats.failed_parse += 1;
                continue;
            }
            Err(e) => {
                debug!("Skipping line {}: {e}", index + 1);
                stats.failed_parse += 1;
                continue;
            }
        };
        stats.parsed += 1;

        if record.hose_code.is_empty() {
            stats.no_hose_code += 1;
            continue;
        }
        if failed_codes.contains(&record.hose_code) {
            stats.failed_convert += 1;
            continue;
        }

        if !lookup.contains_key(&record.hose_code) {
            let central = central_atom_from_nucleus(record.nucleus.as_str());
            match convert(&record.hose_code, central) {
                Some(smiles) => {
                    lookup.insert(
                        record.hose_code.clone(),
                        LookupEntry {
                            central_atom: central.to_string(),
                            smiles,
                            solvents: BTreeMap::new(),
                        },
                    );
                }
                None => {
                    stats.failed_convert += 1;
                    failed_codes.insert(record.hose_code.clone());
                    continue;
                }
            }
        }

        stats.converted += 1;
        if let Some(entry) = lookup.get_mut(&record.hose_code) {
            entry
                .solvents
                .entry(record.solvent.clone())
                .and_modify(|shifts| shifts.merge(&record))
                .or_insert_with(|| ShiftStats::from_record(&record));
        }

        if stats.total % PROGRESS_INTERVAL == 0 {
            info!(
                "Processed {} lines ({} converted, {} failed)",
                stats.total,
                stats.converted,
                stats.failed_parse + stats.failed_convert
            );
        }
    }

    info!(
        "Built lookup with {} distinct HOSE codes from {} lines",
        lookup.len(),
        stats.total
    );
    Ok((lookup, stats))
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Write the lookup table as CSV, one row per (HOSE code, solvent).
pub fn write_lookup_csv<W: Write>(lookup: &Lookup, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        "hose_code",
        "central_atom",
        "smiles",
        "solvent",
        "min_shift",
        "max_shift",
        "avg_shift",
        "count",
    ])?;
    for (hose_code, entry) in lookup {
        for (solvent, shifts) in &entry.solvents {
            wtr.write_record([
                hose_code.clone(),
                entry.central_atom.clone(),
                entry.smiles.clone(),
                solvent.clone(),
                round4(shifts.min).to_string(),
                round4(shifts.max).to_string(),
                round4(shifts.average()).to_string(),
                shifts.count.to_string(),
            ])
            .context(format!("Failed to write lookup row for {hose_code}"))?;
        }
    }
    wtr.flush()?;
    Ok(())
}
