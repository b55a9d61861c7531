//! SQLite persistence for acquired blocks
//!
//! One row per block in a `signals` table: UTC timestamp, the raw I/Q
//! block and the demodulated block, both serialized as little-endian f64
//! blobs. Appends are fire-and-forget from the pipeline's perspective;
//! a failed insert is logged by the acquisition loop and acquisition
//! continues.

use chrono::Utc;
use rusqlite::{params, Connection};

use iqflow::{ComplexSample, RecordSink, Result, Sample};

pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open (or create) the database and make sure the `signals` table exists.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_error)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS signals (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME,
                raw_data BLOB,
                message BLOB
            )",
            [],
        )
        .map_err(db_error)?;
        Ok(Self { conn })
    }
}

impl RecordSink for SqliteSink {
    fn append(&mut self, raw: &[ComplexSample], demodulated: &[Sample]) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO signals (timestamp, raw_data, message) VALUES (?1, ?2, ?3)",
                params![
                    timestamp,
                    complex_to_le_bytes(raw),
                    samples_to_le_bytes(demodulated)
                ],
            )
            .map_err(db_error)?;
        Ok(())
    }
}

fn db_error(err: rusqlite::Error) -> iqflow::Error {
    iqflow::Error::Io(std::io::Error::other(format!("sqlite: {}", err)))
}

/// Interleaved I/Q as little-endian f64 pairs.
fn complex_to_le_bytes(samples: &[ComplexSample]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 16);
    for s in samples {
        bytes.extend_from_slice(&s.re.to_le_bytes());
        bytes.extend_from_slice(&s.im.to_le_bytes());
    }
    bytes
}

fn samples_to_le_bytes(samples: &[Sample]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 8);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_inserts_one_row_per_block() {
        let path = "/tmp/fmlogger_test_rows.db";
        std::fs::remove_file(path).ok();

        let mut sink = SqliteSink::open(path).expect("open failed");
        let raw = vec![ComplexSample::new(0.5, -0.5); 8];
        let demod = vec![100.0; 7];

        sink.append(&raw, &demod).expect("append failed");
        sink.append(&raw, &demod).expect("append failed");

        let count: i64 = sink
            .conn
            .query_row("SELECT COUNT(*) FROM signals", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_blob_sizes_match_block_sizes() {
        let path = "/tmp/fmlogger_test_blobs.db";
        std::fs::remove_file(path).ok();

        let mut sink = SqliteSink::open(path).expect("open failed");
        let raw = vec![ComplexSample::new(1.0, 0.0); 16];
        let demod = vec![-250.0; 15];
        sink.append(&raw, &demod).expect("append failed");

        let (raw_len, demod_len): (i64, i64) = sink
            .conn
            .query_row(
                "SELECT length(raw_data), length(message) FROM signals",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(raw_len, 16 * 16, "16 samples, two f64 each");
        assert_eq!(demod_len, 15 * 8, "15 values, one f64 each");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_reopen_keeps_existing_rows() {
        let path = "/tmp/fmlogger_test_reopen.db";
        std::fs::remove_file(path).ok();

        {
            let mut sink = SqliteSink::open(path).expect("open failed");
            sink.append(&[ComplexSample::new(0.0, 0.0); 4], &[0.0; 3])
                .expect("append failed");
        }

        let sink = SqliteSink::open(path).expect("reopen failed");
        let count: i64 = sink
            .conn
            .query_row("SELECT COUNT(*) FROM signals", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        std::fs::remove_file(path).ok();
    }
}
