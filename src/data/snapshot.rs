//! Persistence of a built [`SimilarityModel`]
//!
//! The snapshot is a bincode encoding of `{ format_version, model }`. Loading
//! re-validates the shape invariants before handing the model out.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::similarity::SimilarityModel,
};

/// Bumped whenever the encoded layout changes
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFile<'a> {
    format_version: u32,
    model: Cow<'a, SimilarityModel>,
}

pub fn write_snapshot<W: Write>(writer: W, model: &SimilarityModel) -> AppResult<()> {
    let file = SnapshotFile {
        format_version: SNAPSHOT_FORMAT_VERSION,
        model: Cow::Borrowed(model),
    };
    bincode::serialize_into(writer, &file)?;
    Ok(())
}

pub fn read_snapshot<R: Read>(reader: R) -> AppResult<SimilarityModel> {
    let file: SnapshotFile<'static> = bincode::deserialize_from(reader)?;
    if file.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(AppError::InvalidSnapshot(format!(
            "unsupported snapshot version {} (expected {})",
            file.format_version, SNAPSHOT_FORMAT_VERSION
        )));
    }
    let model = file.model.into_owned();
    model.validate()?;
    Ok(model)
}

/// Writes the snapshot to a uniquely named sibling temp file, then renames it
/// into place, so concurrent saves never share a file
pub fn save_snapshot(path: impl AsRef<Path>, model: &SimilarityModel) -> AppResult<()> {
    let path = path.as_ref();
    let tmp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4()));

    let written = File::create(&tmp_path)
        .map_err(AppError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write_snapshot(&mut writer, model)?;
            writer.flush()?;
            Ok(())
        })
        .and_then(|()| std::fs::rename(&tmp_path, path).map_err(AppError::from));

    if let Err(e) = written {
        std::fs::remove_file(&tmp_path).ok();
        return Err(e);
    }

    tracing::info!(
        path = %path.display(),
        items = model.info().items,
        "Model snapshot saved"
    );
    Ok(())
}

pub fn load_snapshot(path: impl AsRef<Path>) -> AppResult<SimilarityModel> {
    let path = path.as_ref();
    let model = read_snapshot(BufReader::new(File::open(path)?))?;

    tracing::info!(
        path = %path.display(),
        items = model.info().items,
        built_at = %model.info().built_at,
        "Model snapshot loaded"
    );
    Ok(model)
}
