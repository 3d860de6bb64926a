// src/level/loader.rs
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{LevelData, LevelInfo};
use crate::{crypto::hash_data, errors::CrowdRunError};

// Magic bytes for .lvl files: "CRWD" in ASCII
pub const LEVEL_MAGIC: [u8; 4] = [0x43, 0x52, 0x57, 0x44];
pub const LEVEL_FORMAT_VERSION: u16 = 1;
pub const LEVEL_EXTENSION: &str = "lvl";

pub struct LevelLoader {
    levels_dir: PathBuf,
}

impl LevelLoader {
    pub fn new(levels_dir: PathBuf) -> Self {
        Self { levels_dir }
    }

    pub fn discover_levels(&self) -> Result<Vec<PathBuf>, CrowdRunError> {
        if !self.levels_dir.is_dir() {
            return Err(CrowdRunError::LevelLoadError(format!(
                "Levels directory not found: {}",
                self.levels_dir.display()
            )));
        }

        let mut levels = Vec::new();
        for entry in WalkDir::new(&self.levels_dir).follow_links(true) {
            let entry = entry.map_err(|e| CrowdRunError::LevelLoadError(format!("Failed to walk levels: {}", e)))?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().and_then(|s| s.to_str()) == Some(LEVEL_EXTENSION) {
                levels.push(path.to_path_buf());
            }
        }
        levels.sort();

        Ok(levels)
    }

    pub fn load_level(&self, path: &Path) -> Result<(LevelInfo, LevelData), CrowdRunError> {
        let bytes = std::fs::read(path)?;
        parse_level_bytes(&bytes)
    }

    // Loads every level it can; broken files are logged and skipped.
    pub fn load_all(&self) -> Result<Vec<(LevelInfo, LevelData)>, CrowdRunError> {
        let paths = self.discover_levels()?;
        log::info!("Found {} .lvl files", paths.len());

        let mut levels = Vec::new();
        for path in paths {
            match self.load_level(&path) {
                Ok((info, data)) => {
                    log::info!("✓ Found level: {} ({})", info.title, info.id);
                    levels.push((info, data));
                }
                Err(e) => {
                    log::warn!("✗ Failed to parse level file {:?}: {}", path, e);
                }
            }
        }

        Ok(levels)
    }
}

pub fn parse_level_bytes(bytes: &[u8]) -> Result<(LevelInfo, LevelData), CrowdRunError> {
    let mut cursor = bytes;

    // Read and verify magic bytes
    let magic = take(&mut cursor, 4)?;
    if magic != &LEVEL_MAGIC[..] {
        return Err(CrowdRunError::LevelLoadError("Invalid .lvl file format".to_string()));
    }

    // Read version
    let version_bytes = take(&mut cursor, 2)?;
    let version = u16::from_le_bytes([version_bytes[0], version_bytes[1]]);
    if version != LEVEL_FORMAT_VERSION {
        return Err(CrowdRunError::LevelLoadError(format!(
            "Unsupported .lvl version: {}",
            version
        )));
    }

    // Read header size
    let size_bytes = take(&mut cursor, 4)?;
    let header_size = u32::from_le_bytes([size_bytes[0], size_bytes[1], size_bytes[2], size_bytes[3]]) as usize;

    let header = take(&mut cursor, header_size)?;
    let info: LevelInfo = serde_json::from_slice(header)
        .map_err(|e| CrowdRunError::LevelLoadError(format!("Failed to parse level info: {}", e)))?;

    // The rest is the level data block
    if hash_data(cursor) != info.checksum {
        return Err(CrowdRunError::LevelLoadError(format!(
            "Level checksum mismatch: {}",
            info.title
        )));
    }
    let data: LevelData = serde_json::from_slice(cursor)
        .map_err(|e| CrowdRunError::LevelLoadError(format!("Failed to parse level data: {}", e)))?;

    Ok((info, data))
}

pub fn encode_level(title: &str, data: &LevelData) -> Result<(LevelInfo, Vec<u8>), CrowdRunError> {
    let data_json = serde_json::to_vec(data)?;
    let mut info = LevelInfo::new(title.to_string());
    info.checksum = hash_data(&data_json);

    let info_json = serde_json::to_vec(&info)?;
    let mut bytes = Vec::with_capacity(10 + info_json.len() + data_json.len());
    bytes.extend_from_slice(&LEVEL_MAGIC);
    bytes.extend_from_slice(&LEVEL_FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(info_json.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&info_json);
    bytes.extend_from_slice(&data_json);

    Ok((info, bytes))
}

pub fn write_level_file(path: &Path, title: &str, data: &LevelData) -> Result<LevelInfo, CrowdRunError> {
    let (info, bytes) = encode_level(title, data)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    log::info!("Wrote level {} to {}", info.title, path.display());
    Ok(info)
}

fn take<'a>(cursor: &mut &'a [u8], len: usize) -> Result<&'a [u8], CrowdRunError> {
    if cursor.len() < len {
        return Err(CrowdRunError::LevelLoadError("Unexpected end of level file".to_string()));
    }
    let (head, tail) = cursor.split_at(len);
    *cursor = tail;
    Ok(head)
}
