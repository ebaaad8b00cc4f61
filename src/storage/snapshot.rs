//! Binary snapshot codec.
//!
//! Layout, all integers little-endian fixed width:
//!
//! ```text
//! magic u32 | header | table* ...
//! header = version u32, table_count u32, name [64], created_at [32]
//! table  = name [64], columns (u64 count + descriptors), row_count u32, next_id u32, row*
//! column = name [64], type tag u8, nullable u8, primary_key u8
//! row    = 32 value slots of 256 bytes, 32 null flags, tombstone u8
//! ```
//!
//! Fixed-width byte fields carry bincode's u64 length prefix. Every row record
//! has the same width whatever the table's column count.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use bincode::{ErrorKind, Options};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{
    error::{Error, LoadError, Result},
    sql::{
        schema::{Catalog, Column, MAX_COLUMNS, MAX_NAME_LEN, MAX_TABLES, Row, TEXT_CAPACITY, Table},
        types::{DataType, Value},
    },
};

pub const MAGIC: u32 = 0x444D_4742;
pub const VERSION: u32 = 1;

const NAME_WIDTH: usize = MAX_NAME_LEN + 1;
const CREATED_WIDTH: usize = 32;
/// Wide enough for the largest value: text plus its terminator
const SLOT_WIDTH: usize = TEXT_CAPACITY + 1;
/// Upper bound for one decoded record, a row is a little over 8 KiB
const RECORD_LIMIT: u64 = 64 * 1024;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    version: u32,
    table_count: u32,
    #[serde(with = "serde_bytes")]
    name: Vec<u8>,
    #[serde(with = "serde_bytes")]
    created_at: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableRecord {
    #[serde(with = "serde_bytes")]
    name: Vec<u8>,
    columns: Vec<ColumnRecord>,
    row_count: u32,
    next_id: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnRecord {
    #[serde(with = "serde_bytes")]
    name: Vec<u8>,
    datatype: u8,
    nullable: bool,
    primary_key: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct RowRecord {
    #[serde(with = "serde_bytes")]
    values: Vec<u8>,
    #[serde(with = "serde_bytes")]
    nulls: Vec<u8>,
    deleted: bool,
}

fn options() -> impl Options {
    bincode::options()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(RECORD_LIMIT)
}

/// Writes the snapshot to `path`, replacing it only once fully written
pub fn save(catalog: &Catalog, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write_snapshot(catalog, &mut writer)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path)?;
    debug!(path = %path.display(), tables = catalog.tables.len(), "snapshot written");
    Ok(())
}

/// Reads the snapshot at `path`
pub fn load(path: &Path) -> Result<Catalog> {
    let file = File::open(path).map_err(|e| LoadError::Io(e.to_string()))?;
    read_snapshot(&mut BufReader::new(file))
}

pub fn write_snapshot<W: Write>(catalog: &Catalog, w: &mut W) -> Result<()> {
    options().serialize_into(&mut *w, &MAGIC)?;
    options().serialize_into(
        &mut *w,
        &Header {
            version: VERSION,
            table_count: count(catalog.tables.len())?,
            name: fixed(&catalog.name, NAME_WIDTH),
            created_at: fixed(&catalog.created_at, CREATED_WIDTH),
        },
    )?;

    for table in &catalog.tables {
        options().serialize_into(&mut *w, &encode_table(table)?)?;
        for row in &table.rows {
            options().serialize_into(&mut *w, &encode_row(row))?;
        }
    }
    Ok(())
}

/// Reads a snapshot. Running out of data after the header ends the catalog
/// early instead of failing: tables read so far (and the complete rows of a
/// cut-off table) are kept.
pub fn read_snapshot<R: Read>(r: &mut R) -> Result<Catalog> {
    let magic: u32 = read(r)?;
    if magic != MAGIC {
        return Err(LoadError::BadMagic { found: magic }.into());
    }
    let header: Header = read(r)?;
    if header.version != VERSION {
        return Err(corrupt(format!("unsupported version {}", header.version)));
    }
    if header.table_count as usize > MAX_TABLES {
        return Err(corrupt(format!("{} tables (max {})", header.table_count, MAX_TABLES)));
    }

    let mut catalog = Catalog {
        name: unfixed(&header.name),
        created_at: unfixed(&header.created_at),
        tables: Vec::new(),
    };

    'tables: for _ in 0..header.table_count {
        let record: TableRecord = match read(r) {
            Ok(record) => record,
            Err(LoadError::Truncated) => {
                warn!(loaded = catalog.tables.len(), "snapshot truncated, remaining tables skipped");
                break;
            }
            Err(err) => return Err(err.into()),
        };
        let row_count = record.row_count;
        let mut table = decode_table(record)?;

        for _ in 0..row_count {
            match read::<RowRecord, _>(r) {
                Ok(record) => table.rows.push(decode_row(record, &table.columns)?),
                Err(LoadError::Truncated) => {
                    warn!(
                        table = %table.name,
                        loaded = table.rows.len(),
                        expected = row_count,
                        "snapshot truncated inside table"
                    );
                    catalog.tables.push(table);
                    break 'tables;
                }
                Err(err) => return Err(err.into()),
            }
        }
        catalog.tables.push(table);
    }
    Ok(catalog)
}

fn read<T: DeserializeOwned, R: Read>(r: &mut R) -> std::result::Result<T, LoadError> {
    options().deserialize_from(&mut *r).map_err(|err| match *err {
        ErrorKind::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => LoadError::Truncated,
        ErrorKind::Io(e) => LoadError::Io(e.to_string()),
        err => LoadError::Corrupt(err.to_string()),
    })
}

fn encode_table(table: &Table) -> Result<TableRecord> {
    Ok(TableRecord {
        name: fixed(&table.name, NAME_WIDTH),
        columns: table
            .columns
            .iter()
            .map(|c| ColumnRecord {
                name: fixed(&c.name, NAME_WIDTH),
                datatype: c.datatype.tag(),
                nullable: c.nullable,
                primary_key: c.primary_key,
            })
            .collect(),
        row_count: count(table.rows.len())?,
        next_id: table.next_id,
    })
}

fn decode_table(record: TableRecord) -> Result<Table> {
    if record.columns.is_empty() || record.columns.len() > MAX_COLUMNS {
        return Err(corrupt(format!("{} columns", record.columns.len())));
    }
    let columns = record
        .columns
        .into_iter()
        .map(|c| {
            Ok(Column {
                name: unfixed(&c.name),
                datatype: DataType::from_tag(c.datatype)
                    .ok_or_else(|| corrupt(format!("unknown type tag {}", c.datatype)))?,
                nullable: c.nullable,
                primary_key: c.primary_key,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = Table::new(unfixed(&record.name), columns);
    table.next_id = record.next_id;
    Ok(table)
}

fn encode_row(row: &Row) -> RowRecord {
    let mut values = vec![0u8; MAX_COLUMNS * SLOT_WIDTH];
    let mut nulls = vec![0u8; MAX_COLUMNS];
    for (i, value) in row.values.iter().enumerate() {
        let slot = &mut values[i * SLOT_WIDTH..(i + 1) * SLOT_WIDTH];
        match value {
            Some(value) => encode_value(value, slot),
            None => nulls[i] = 1,
        }
    }
    RowRecord { values, nulls, deleted: row.deleted }
}

fn decode_row(record: RowRecord, columns: &[Column]) -> Result<Row> {
    if record.values.len() != MAX_COLUMNS * SLOT_WIDTH || record.nulls.len() != MAX_COLUMNS {
        return Err(corrupt("row record has the wrong width".into()));
    }
    let values = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            (record.nulls[i] == 0)
                .then(|| decode_value(&record.values[i * SLOT_WIDTH..(i + 1) * SLOT_WIDTH], column.datatype))
        })
        .collect();
    Ok(Row { values, deleted: record.deleted })
}

fn encode_value(value: &Value, slot: &mut [u8]) {
    match value {
        Value::Integer(v) => slot[..8].copy_from_slice(&v.to_le_bytes()),
        Value::Float(v) => slot[..8].copy_from_slice(&v.to_le_bytes()),
        Value::Text(s) => {
            let n = s.len().min(TEXT_CAPACITY);
            slot[..n].copy_from_slice(&s.as_bytes()[..n]);
        }
        Value::Boolean(b) => slot[0] = *b as u8,
    }
}

fn decode_value(slot: &[u8], datatype: DataType) -> Value {
    let mut word = [0u8; 8];
    word.copy_from_slice(&slot[..8]);
    match datatype {
        DataType::Integer => Value::Integer(i64::from_le_bytes(word)),
        DataType::Float => Value::Float(f64::from_le_bytes(word)),
        DataType::Text => Value::Text(unfixed(slot)),
        DataType::Boolean => Value::Boolean(slot[0] != 0),
    }
}

/// Zero-padded field of exactly `width` bytes, always zero-terminated
fn fixed(s: &str, width: usize) -> Vec<u8> {
    let mut buf = vec![0u8; width];
    let bytes = s.as_bytes();
    let n = bytes.len().min(width - 1);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

fn unfixed(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

fn count(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::Internal(format!("count {} does not fit the snapshot", n)))
}

fn corrupt(msg: String) -> Error {
    Error::Load(LoadError::Corrupt(msg))
}
