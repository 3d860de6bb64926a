// src/saves/mod.rs
use std::collections::HashMap;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::crypto::{decrypt_data, derive_encryption_key, encrypt_data, hash_data};
use crate::errors::CrowdRunError;

const SAVE_FORMAT_VERSION: u32 = 1;

pub fn level_done_key(lvl_num: u32) -> String {
    format!("Level_{}_Done", lvl_num)
}

pub trait PreferenceStore {
    fn set_int(&mut self, key: &str, value: i64);
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn flush(&mut self) -> Result<(), CrowdRunError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, i64>,
    flushes: usize,
}

impl MemoryStore {
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl PreferenceStore for MemoryStore {
    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn flush(&mut self) -> Result<(), CrowdRunError> {
        self.flushes += 1;
        Ok(())
    }
}

pub struct SaveManager {
    saves_dir: PathBuf,
    current_game_id: Option<String>,
    current_save_data: HashMap<String, i64>,
    encryption_key: Option<[u8; 32]>,
}

#[derive(Serialize, Deserialize)]
struct SaveFileData {
    version: u32,
    game_id: String,
    data: Vec<(String, i64)>,
    checksum: String,
    timestamp: u64,
}

impl SaveManager {
    pub fn new(saves_dir: PathBuf) -> Self {
        Self {
            saves_dir,
            current_game_id: None,
            current_save_data: HashMap::new(),
            encryption_key: None,
        }
    }

    pub fn set_game_context(&mut self, game_id: String, secret_key: &str) -> Result<(), CrowdRunError> {
        self.current_game_id = Some(game_id.clone());
        self.encryption_key = Some(derive_encryption_key(secret_key));
        self.current_save_data.clear();

        let game_save_dir = self.saves_dir.join(format!("{}_saves", sanitize_game_id(&game_id)));
        std::fs::create_dir_all(&game_save_dir)?;

        self.load_save_data()?;
        Ok(())
    }

    pub fn has_context(&self) -> bool {
        self.current_game_id.is_some()
    }

    pub fn save_to_disk(&self) -> Result<(), CrowdRunError> {
        let game_id = self.current_game_id.as_ref()
            .ok_or_else(|| CrowdRunError::SaveError("No game context set".to_string()))?;

        let encryption_key = self.encryption_key.as_ref()
            .ok_or_else(|| CrowdRunError::SaveError("No encryption key available".to_string()))?;

        let data = sorted_entries(&self.current_save_data);
        let save_file_data = SaveFileData {
            version: SAVE_FORMAT_VERSION,
            game_id: game_id.clone(),
            checksum: calculate_data_checksum(&data)?,
            data,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };

        let serialized_data = bincode::serialize(&save_file_data)
            .map_err(|e| CrowdRunError::SaveError(format!("Failed to serialize save data: {}", e)))?;

        let encrypted_data = encrypt_data(&serialized_data, encryption_key)?;

        let save_file_path = self.get_save_file_path(game_id);
        std::fs::write(&save_file_path, &encrypted_data)?;

        log::info!("Save data written to: {}", save_file_path.display());
        Ok(())
    }

    fn load_save_data(&mut self) -> Result<(), CrowdRunError> {
        let game_id = self.current_game_id.as_ref()
            .ok_or_else(|| CrowdRunError::SaveError("No game context set".to_string()))?;

        let encryption_key = self.encryption_key.as_ref()
            .ok_or_else(|| CrowdRunError::SaveError("No encryption key available".to_string()))?;

        let save_file_path = self.get_save_file_path(game_id);

        if !save_file_path.exists() {
            log::info!("No existing save file found for game: {}", game_id);
            return Ok(());
        }

        let encrypted_data = std::fs::read(&save_file_path)?;
        let decrypted_data = decrypt_data(&encrypted_data, encryption_key)?;

        let save_file_data: SaveFileData = bincode::deserialize(&decrypted_data)
            .map_err(|e| CrowdRunError::SaveError(format!("Failed to deserialize save data: {}", e)))?;

        if save_file_data.version != SAVE_FORMAT_VERSION {
            return Err(CrowdRunError::SaveError(format!(
                "Unsupported save version: {}",
                save_file_data.version
            )));
        }

        let expected_checksum = calculate_data_checksum(&save_file_data.data)?;
        if save_file_data.checksum != expected_checksum {
            return Err(CrowdRunError::SaveError("Save file checksum mismatch - data may be corrupted".to_string()));
        }

        if save_file_data.game_id != *game_id {
            return Err(CrowdRunError::SaveError("Save file game ID mismatch".to_string()));
        }

        self.current_save_data = save_file_data.data.into_iter().collect();
        log::info!("Save data loaded for game: {}", game_id);
        Ok(())
    }

    fn get_save_file_path(&self, game_id: &str) -> PathBuf {
        let game_save_dir = self.saves_dir.join(format!("{}_saves", sanitize_game_id(game_id)));
        game_save_dir.join("save.dat")
    }
}

impl SaveManager {
    pub fn completed_levels(&self, level_count: u32) -> Vec<u32> {
        (0..level_count)
            .filter(|n| self.get_int(&level_done_key(*n), 0) == 1)
            .collect()
    }
}

impl PreferenceStore for SaveManager {
    fn set_int(&mut self, key: &str, value: i64) {
        self.current_save_data.insert(key.to_string(), value);
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.current_save_data.get(key).copied().unwrap_or(default)
    }

    fn flush(&mut self) -> Result<(), CrowdRunError> {
        if !self.has_context() {
            log::debug!("No game context set, keeping progress in memory");
            return Ok(());
        }
        self.save_to_disk()
    }
}

fn sorted_entries(data: &HashMap<String, i64>) -> Vec<(String, i64)> {
    let mut entries: Vec<(String, i64)> = data
        .iter()
        .map(|(key, value)| (key.clone(), *value))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

fn calculate_data_checksum(data: &[(String, i64)]) -> Result<String, CrowdRunError> {
    let serialized = bincode::serialize(data)
        .map_err(|e| CrowdRunError::SaveError(format!("Failed to serialize data for checksum: {}", e)))?;
    Ok(hash_data(&serialized))
}

fn sanitize_game_id(game_id: &str) -> String {
    game_id
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
